use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use std::str::FromStr;
use a2kit_macro::{DiskStruct,DiskStructError};
use a2kit_macro_derive::DiskStruct;
use super::super::Error;

pub const SECS_PER_TRACK: usize = 16;
pub const SECS_PER_CLUSTER: usize = 8;
pub const SECTOR_SIZE: usize = 256;
/// valid cluster numbers are 0..=151
pub const MAX_CLUSTER: usize = 151;
/// clusters begin at track 4
pub const CLUSTER_BASE_LBA: usize = SECS_PER_TRACK * 4;
/// the FAT is the single sector at CHR (1,0,1)
pub const FAT_CHR: [u8;3] = [1,0,1];
/// cluster k occupies FAT byte `FAT_OFFSET + k`
pub const FAT_OFFSET: usize = 5;
/// the directory starts at CHR (1,0,4), LBA 35
pub const DIR_START_LBA: usize = 35;
pub const DIR_SECTORS: usize = 28;
pub const DIR_ENTRY_SIZE: usize = 32;
pub const ENTRIES_PER_SECTOR: usize = SECTOR_SIZE / DIR_ENTRY_SIZE;
/// the disk id sector at CHR (0,0,3) starts with this byte on a formatted disk
pub const DISK_ID: u8 = b'S';

/// FAT terminators: 0xC0..=0xC7 end a chain using 1..=8 sectors of the last
/// cluster, `EMPTY_TAIL` ends it using none, `RESERVED` belongs to the
/// system, `FREE` is unallocated.
pub const TERMINAL_BASE: u8 = 0xc0;
pub const EMPTY_TAIL: u8 = 0xfd;
pub const RESERVED: u8 = 0xfe;
pub const FREE: u8 = 0xff;

/// Enumerates the three file types, available conversions are:
/// * FileType to u8: `as u8`
/// * u8 to FileType: `FileType::from_u8` (use FromPrimitive trait)
/// * &str to FileType: `FileType::from_str`, str can be a number or mnemonic
#[derive(FromPrimitive,PartialEq,Clone,Copy)]
pub enum FileType {
    Basic = 0x00,
    Data = 0x01,
    Machine = 0x02
}

impl FromStr for FileType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self,Self::Err> {
        // string can be the number itself
        if let Ok(num) = u8::from_str(s) {
            return match FileType::from_u8(num) {
                Some(typ) => Ok(typ),
                _ => Err(Error::BadAttribute)
            };
        }
        // or a mnemonic
        match s {
            "bas" => Ok(Self::Basic),
            "dat" => Ok(Self::Data),
            "bin" => Ok(Self::Machine),
            _ => Err(Error::BadAttribute)
        }
    }
}

/// The meaningful bytes of a 32-byte directory slot.  The remaining 17
/// bytes of the slot are never touched by any operation.
#[derive(DiskStruct)]
pub struct DirEntry {
    pub name: [u8;8],
    pub pad1: [u8;3],
    pub file_type: u8,
    pub ascii_flag: u8,
    pub random_access_flag: u8,
    pub top_cluster: u8
}

/// The attribute triple stored with every directory entry.
#[derive(PartialEq,Clone,Copy)]
pub struct FileAttributes {
    /// 0 BASIC source, 1 BASIC data, 2 machine code
    pub file_type: u8,
    /// 0x00 binary, 0xFF ASCII
    pub ascii_flag: u8,
    /// 0x00 sequential, 0xFF random access
    pub random_access_flag: u8
}

impl FileAttributes {
    pub fn new(file_type: u8,ascii_flag: u8,random_access_flag: u8) -> Self {
        Self { file_type, ascii_flag, random_access_flag }
    }
    pub fn is_valid(&self) -> bool {
        FileType::from_u8(self.file_type).is_some()
            && (self.ascii_flag==0x00 || self.ascii_flag==0xff)
            && (self.random_access_flag==0x00 || self.random_access_flag==0xff)
    }
    /// Three character tag such as `0BS`, used as a host file extension.
    /// Out of range values show as `?`.
    pub fn to_tag(&self) -> String {
        let typ = match self.file_type {
            t if t <= 2 => char::from(b'0' + t),
            _ => '?'
        };
        let ascii = match self.ascii_flag {
            0x00 => 'B',
            0xff => 'A',
            _ => '?'
        };
        let random = match self.random_access_flag {
            0x00 => 'S',
            0xff => 'R',
            _ => '?'
        };
        format!("{}{}{}",typ,ascii,random)
    }
}

/// Read the attribute triple back from a tag such as `0BS` or `2AR`.
impl FromStr for FileAttributes {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self,Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 3 {
            return Err(Error::BadAttribute);
        }
        let file_type = match chars[0] {
            '0' | '1' | '2' => chars[0] as u8 - b'0',
            _ => return Err(Error::BadAttribute)
        };
        let ascii_flag = match chars[1] {
            'B' | 'b' => 0x00,
            'A' | 'a' => 0xff,
            _ => return Err(Error::BadAttribute)
        };
        let random_access_flag = match chars[2] {
            'S' | 's' => 0x00,
            'R' | 'r' => 0xff,
            _ => return Err(Error::BadAttribute)
        };
        Ok(Self { file_type, ascii_flag, random_access_flag })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_tags() {
        let attr = FileAttributes::new(0,0x00,0x00);
        assert_eq!(attr.to_tag(),"0BS");
        let attr = FileAttributes::new(2,0xff,0xff);
        assert_eq!(attr.to_tag(),"2AR");
        let attr = FileAttributes::new(7,0x55,0x00);
        assert_eq!(attr.to_tag(),"??S");
        assert!(!attr.is_valid());
    }
    #[test]
    fn attribute_parsing() {
        let attr = FileAttributes::from_str("0bs").expect("parse error");
        assert_eq!((attr.file_type,attr.ascii_flag,attr.random_access_flag),(0,0x00,0x00));
        let attr = FileAttributes::from_str("2AR").expect("parse error");
        assert_eq!((attr.file_type,attr.ascii_flag,attr.random_access_flag),(2,0xff,0xff));
        assert!(FileAttributes::from_str("3BS").is_err());
        assert!(FileAttributes::from_str("0B").is_err());
    }
    #[test]
    fn file_types() {
        assert!(matches!(FileType::from_str("2"),Ok(FileType::Machine)));
        assert!(matches!(FileType::from_str("bas"),Ok(FileType::Basic)));
        assert!(FileType::from_str("5").is_err());
        assert_eq!(FileType::Data as u8,1);
    }
    #[test]
    fn entry_record_shape() {
        let entry = DirEntry {
            name: *b"TESTFILE",
            pad1: [0;3],
            file_type: 0,
            ascii_flag: 0,
            random_access_flag: 0,
            top_cluster: 5
        };
        let bytes = entry.to_bytes();
        assert_eq!(bytes.len(),15);
        assert_eq!(bytes[0..8],*b"TESTFILE");
        assert_eq!(bytes[14],5);
        let copy = DirEntry::from_bytes(&bytes).expect("parse error");
        assert_eq!(copy.name,*b"TESTFILE");
        assert_eq!(copy.top_cluster,5);
    }
}
