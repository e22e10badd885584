//! # FM file system module
//!
//! This manipulates one disk of a D88/D77 container as an FM file system:
//! a single-sector FAT mapping 152 clusters of 8 sectors, and a 224-entry
//! directory.  Analogues of the F-BASIC disk commands (FILES, LOAD, SAVE,
//! KILL) are exposed as read/write/delete operations.
//!
//! * All operations go through the disk's sector reads and writes; the FAT
//!   and directory are re-read for every operation rather than cached.
//! * Writes mutate the in-memory disk only; a failed write (disk full) can
//!   leave sectors and FAT bytes changed.  Callers recover by discarding
//!   the in-memory container or re-reading it from file.

pub mod types;
pub mod pack;

use a2kit_macro::DiskStruct;
use log::{warn,debug};
use types::*;
use super::Error;
use crate::img;
use crate::lang::fbasic::charset;
use crate::{STDRESULT,DYNERR};

/// Linear block address of a C/H/R triple; LBA 0 is CHR (0,0,1).
pub fn chr_to_lba(c: u8,h: u8,r: u8) -> usize {
    (c as usize*2 + h as usize) * SECS_PER_TRACK + r as usize - 1
}

pub fn lba_to_chr(lba: usize) -> [u8;3] {
    let track = lba / SECS_PER_TRACK;
    [(track/2) as u8,(track%2) as u8,(lba % SECS_PER_TRACK + 1) as u8]
}

/// Cluster containing the LBA, or -1 for the system area before track 4.
pub fn lba_to_cluster(lba: usize) -> i64 {
    if lba < CLUSTER_BASE_LBA {
        return -1;
    }
    ((lba - CLUSTER_BASE_LBA) / SECS_PER_CLUSTER) as i64
}

/// LBA of the first sector of a cluster.
pub fn cluster_to_lba(cluster: usize) -> usize {
    CLUSTER_BASE_LBA + cluster * SECS_PER_CLUSTER
}

/// Cluster containing the C/H/R triple, or -1 for the system area.
pub fn chr_to_cluster(c: u8,h: u8,r: u8) -> i64 {
    if c < 2 {
        return -1;
    }
    lba_to_cluster(chr_to_lba(c,h,r))
}

pub fn cluster_to_chr(cluster: usize) -> [u8;3] {
    lba_to_chr(cluster_to_lba(cluster))
}

/// Pad a file name out to the stored 8 bytes with spaces.
/// None if it cannot fit, in which case it also cannot match.
fn padded_name(name: &str) -> Option<[u8;8]> {
    let bytes = name.as_bytes();
    if bytes.len() < 1 || bytes.len() > 8 {
        return None;
    }
    let mut ans = [b' ';8];
    ans[0..bytes.len()].copy_from_slice(bytes);
    Some(ans)
}

/// A directory entry joined with its chain length, as produced by the
/// directory listing operations.
#[derive(Clone)]
pub struct FileInfo {
    pub name: [u8;8],
    pub file_type: u8,
    pub ascii_flag: u8,
    pub random_access_flag: u8,
    pub top_cluster: u8,
    /// sectors actually used, per the FAT chain
    pub num_sectors: usize,
    /// position in the directory, 0..224
    pub dir_idx: usize
}

impl FileInfo {
    /// File name through the half-width character table, trailing fill trimmed.
    pub fn name_string(&self) -> String {
        let mut ans = String::new();
        for byte in self.name {
            ans += &charset::to_utf8(byte);
        }
        ans.trim_end_matches(' ').to_string()
    }
    pub fn attributes(&self) -> FileAttributes {
        FileAttributes::new(self.file_type,self.ascii_flag,self.random_access_flag)
    }
}

/// The primary interface for file operations.  The view borrows one disk
/// out of a container for the duration of the operation set.
pub struct FileSystem<'a> {
    disk: &'a mut img::Disk
}

impl <'a> FileSystem<'a> {
    pub fn new(disk: &'a mut img::Disk) -> Self {
        Self {
            disk
        }
    }
    /// A formatted disk carries an id sector whose first byte is `'S'`.
    pub fn check_disk_id(&self) -> Result<bool,DYNERR> {
        let id_sect = self.disk.read_sector(0,[0,0,3],true)?;
        Ok(id_sect.data.first() == Some(&DISK_ID))
    }

    pub fn read_fat(&self) -> Result<Vec<u8>,DYNERR> {
        let sect = self.disk.read_sector(2,FAT_CHR,true)?;
        if sect.data.len() < FAT_OFFSET + MAX_CLUSTER + 1 {
            return Err(Box::new(Error::FileSystemMismatch));
        }
        Ok(sect.data.clone())
    }
    pub fn write_fat(&mut self,fat: &[u8]) -> STDRESULT {
        self.disk.write_sector(2,FAT_CHR,fat,0,0,0,true,false)
    }
    /// Walk the FAT from `start_cluster` to a terminator.  Returns the chain
    /// and the count of sectors used in the last cluster; a free or reserved
    /// starting point returns an empty chain with the count -1.  A chain
    /// longer than the cluster count, a reserved terminator 0xC8..=0xCF, or
    /// a link out of range is a corrupt FAT.
    pub fn trace_chain(&self,start_cluster: u8) -> Result<(Vec<u8>,i64),DYNERR> {
        let fat = self.read_fat()?;
        let mut chain: Vec<u8> = Vec::new();
        let mut curr = start_cluster;
        loop {
            if curr as usize > MAX_CLUSTER || chain.len() > MAX_CLUSTER {
                return Err(Box::new(Error::CorruptFat));
            }
            chain.push(curr);
            let next = fat[FAT_OFFSET + curr as usize];
            match next {
                0x00..=0x97 => curr = next,
                0xc0..=0xc7 => return Ok((chain,(next & 0x0f) as i64 + 1)),
                EMPTY_TAIL => return Ok((chain,0)),
                RESERVED | FREE => return Ok((Vec::new(),-1)),
                _ => return Err(Box::new(Error::CorruptFat))
            }
        }
    }
    /// Free every cluster of the chain, then write the FAT back once.
    pub fn delete_chain(&mut self,chain: &[u8]) -> STDRESULT {
        let mut fat = self.read_fat()?;
        for cluster in chain {
            if *cluster as usize <= MAX_CLUSTER {
                fat[FAT_OFFSET + *cluster as usize] = FREE;
            }
        }
        self.write_fat(&fat)
    }
    /// First free cluster, or -1 when the disk is full.
    pub fn find_empty_cluster(&self) -> Result<i64,DYNERR> {
        let fat = self.read_fat()?;
        for cluster in 0..=MAX_CLUSTER {
            if fat[FAT_OFFSET + cluster] == FREE {
                return Ok(cluster as i64);
            }
        }
        Ok(-1)
    }
    pub fn free_cluster_count(&self) -> Result<usize,DYNERR> {
        let fat = self.read_fat()?;
        Ok(fat[FAT_OFFSET..FAT_OFFSET+MAX_CLUSTER+1].iter().filter(|b| **b==FREE).count())
    }

    fn read_dir_sector(&self,dir_idx: usize) -> Result<Vec<u8>,DYNERR> {
        let sect = self.disk.read_sector_lba(DIR_START_LBA + dir_idx/ENTRIES_PER_SECTOR)?;
        if sect.data.len() < SECTOR_SIZE {
            return Err(Box::new(Error::FileSystemMismatch));
        }
        Ok(sect.data.clone())
    }
    fn write_dir_sector(&mut self,dir_idx: usize,dat: &[u8]) -> STDRESULT {
        self.disk.write_sector_lba(DIR_START_LBA + dir_idx/ENTRIES_PER_SECTOR,dat,0,0,0,false)
    }
    /// Walk all 224 directory slots, joining each with its chain length.
    /// A chain that cannot be walked is logged and listed with 0 sectors.
    pub fn all_entries(&self) -> Result<Vec<FileInfo>,DYNERR> {
        let mut files: Vec<FileInfo> = Vec::new();
        let mut dir_idx = 0;
        for sect_ofst in 0..DIR_SECTORS {
            let dat = self.read_dir_sector(sect_ofst * ENTRIES_PER_SECTOR)?;
            for idx in 0..ENTRIES_PER_SECTOR {
                let entry = DirEntry::from_bytes(&dat[idx*DIR_ENTRY_SIZE..idx*DIR_ENTRY_SIZE+15])?;
                let num_sectors = match entry.top_cluster as usize <= MAX_CLUSTER {
                    true => match self.trace_chain(entry.top_cluster) {
                        Ok((chain,last)) if chain.len() > 0 => (chain.len()-1) * SECS_PER_CLUSTER + last as usize,
                        Ok(_) => 0,
                        Err(e) => {
                            warn!("entry {}: could not walk chain ({})",dir_idx,e);
                            0
                        }
                    },
                    false => 0
                };
                files.push(FileInfo {
                    name: entry.name,
                    file_type: entry.file_type,
                    ascii_flag: entry.ascii_flag,
                    random_access_flag: entry.random_access_flag,
                    top_cluster: entry.top_cluster,
                    num_sectors,
                    dir_idx
                });
                dir_idx += 1;
            }
        }
        Ok(files)
    }
    /// Entries that denote live files: not deleted, never-used, or carrying
    /// out of range attributes.
    pub fn valid_entries(&self) -> Result<Vec<FileInfo>,DYNERR> {
        let mut ans: Vec<FileInfo> = Vec::new();
        for entry in self.all_entries()? {
            if entry.name[0]==0x00 || entry.name[0]==0xff {
                continue;
            }
            if entry.file_type > 2 {
                continue;
            }
            if entry.ascii_flag != 0x00 && entry.ascii_flag != 0xff {
                continue;
            }
            if entry.random_access_flag != 0x00 && entry.random_access_flag != 0xff {
                continue;
            }
            if entry.top_cluster as usize > MAX_CLUSTER {
                continue;
            }
            ans.push(entry);
        }
        Ok(ans)
    }
    fn find(&self,name: &str) -> Result<Option<FileInfo>,DYNERR> {
        let fname = match padded_name(name) {
            Some(f) => f,
            None => return Ok(None)
        };
        for entry in self.valid_entries()? {
            if entry.name == fname {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }
    /// Find the named file.  The comparison pads both sides to 8 bytes with
    /// spaces and is case sensitive.
    pub fn lookup(&self,name: &str) -> Result<FileInfo,DYNERR> {
        match self.find(name)? {
            Some(entry) => Ok(entry),
            None => Err(Box::new(Error::FileNotFound))
        }
    }
    /// First directory slot that is deleted or never used, or -1 when the
    /// directory is full.
    pub fn find_empty_slot(&self) -> Result<i64,DYNERR> {
        let mut dir_idx = 0;
        for sect_ofst in 0..DIR_SECTORS {
            let dat = self.read_dir_sector(sect_ofst * ENTRIES_PER_SECTOR)?;
            for idx in 0..ENTRIES_PER_SECTOR {
                if dat[idx*DIR_ENTRY_SIZE]==0x00 || dat[idx*DIR_ENTRY_SIZE]==0xff {
                    return Ok(dir_idx);
                }
                dir_idx += 1;
            }
        }
        Ok(-1)
    }
    /// Write a new entry into the first empty slot.  Only the 15 meaningful
    /// bytes of the slot are touched.
    pub fn create_entry(&mut self,fname: &[u8;8],attributes: FileAttributes,top_cluster: u8) -> STDRESULT {
        let dir_idx = match self.find_empty_slot()? {
            -1 => return Err(Box::new(Error::DirectoryFull)),
            idx => idx as usize
        };
        let entry = DirEntry {
            name: *fname,
            pad1: [0;3],
            file_type: attributes.file_type,
            ascii_flag: attributes.ascii_flag,
            random_access_flag: attributes.random_access_flag,
            top_cluster
        };
        let mut dat = self.read_dir_sector(dir_idx)?;
        let ofst = (dir_idx % ENTRIES_PER_SECTOR) * DIR_ENTRY_SIZE;
        dat[ofst..ofst+15].copy_from_slice(&entry.to_bytes());
        self.write_dir_sector(dir_idx,&dat)
    }
    /// Mark the slot deleted by zeroing the first name byte; the rest of the
    /// slot is left as a recovery aid.
    pub fn delete_entry(&mut self,dir_idx: usize) -> STDRESULT {
        let mut dat = self.read_dir_sector(dir_idx)?;
        dat[(dir_idx % ENTRIES_PER_SECTOR) * DIR_ENTRY_SIZE] = 0x00;
        self.write_dir_sector(dir_idx,&dat)
    }

    /// Concatenate the payloads of a chain, 8 sectors per cluster except for
    /// the tail count of the last one.
    fn read_cluster_chain(&self,chain: &[u8],last_sectors: i64) -> Result<Vec<u8>,DYNERR> {
        let mut ans: Vec<u8> = Vec::new();
        for (i,cluster) in chain.iter().enumerate() {
            let num_secs = match i+1 == chain.len() {
                true => match last_sectors {
                    -1 => 0,
                    n => n as usize
                },
                false => SECS_PER_CLUSTER
            };
            let lba = cluster_to_lba(*cluster as usize);
            for ofst in 0..num_secs {
                ans.append(&mut self.disk.read_sector_lba(lba + ofst)?.data.clone());
            }
        }
        Ok(ans)
    }
    /// Read a file by name, returning the data and the directory record.
    pub fn read_file(&self,name: &str) -> Result<(Vec<u8>,FileInfo),DYNERR> {
        let entry = self.lookup(name)?;
        let (chain,last_sectors) = self.trace_chain(entry.top_cluster)?;
        let dat = self.read_cluster_chain(&chain,last_sectors)?;
        Ok((dat,entry))
    }
    /// Read a file by its directory index, for names that are awkward to type.
    pub fn read_file_by_index(&self,dir_idx: usize) -> Result<(Vec<u8>,FileInfo),DYNERR> {
        for entry in self.valid_entries()? {
            if entry.dir_idx == dir_idx {
                let (chain,last_sectors) = self.trace_chain(entry.top_cluster)?;
                let dat = self.read_cluster_chain(&chain,last_sectors)?;
                return Ok((dat,entry));
            }
        }
        Err(Box::new(Error::FileNotFound))
    }
    /// Write a file.  Data is padded to a sector boundary with 0xFF.  The FAT
    /// is flushed between cluster allocations so each empty-cluster search
    /// sees the allocations before it, and the directory entry is created
    /// after the last sector regardless of cluster alignment.
    pub fn write_file(&mut self,name: &str,dat: &[u8],attributes: FileAttributes,overwrite: bool) -> STDRESULT {
        let fname = match padded_name(name) {
            Some(f) => f,
            None => return Err(Box::new(Error::BadFileName))
        };
        if !attributes.is_valid() {
            return Err(Box::new(Error::BadAttribute));
        }
        if self.find(name)?.is_some() {
            if !overwrite {
                return Err(Box::new(Error::AlreadyExists));
            }
            self.delete_file(name)?;
        }
        let mut data = dat.to_vec();
        if data.len()==0 || data.len() % SECTOR_SIZE != 0 {
            let padded_len = (data.len() / SECTOR_SIZE + 1) * SECTOR_SIZE;
            data.resize(padded_len,0xff);
        }
        let total_secs = data.len() / SECTOR_SIZE;
        let mut fat = self.read_fat()?;
        let mut top_cluster: Option<u8> = None;
        let mut prev_cluster: Option<u8> = None;
        let mut sec = 0;
        while sec < total_secs {
            // flush before searching so prior allocations are observed
            self.write_fat(&fat)?;
            let curr = match self.find_empty_cluster()? {
                -1 => return Err(Box::new(Error::DiskFull)),
                c => c as u8
            };
            if top_cluster.is_none() {
                top_cluster = Some(curr);
            }
            if let Some(prev) = prev_cluster {
                fat[FAT_OFFSET + prev as usize] = curr;
            }
            let lba = cluster_to_lba(curr as usize);
            let mut used = 0;
            while used < SECS_PER_CLUSTER && sec < total_secs {
                self.disk.write_sector_lba(lba + used,&data[sec*SECTOR_SIZE..(sec+1)*SECTOR_SIZE],0,0,0,false)?;
                used += 1;
                sec += 1;
                fat[FAT_OFFSET + curr as usize] = TERMINAL_BASE + used as u8 - 1;
            }
            debug!("cluster {} takes {} sectors",curr,used);
            prev_cluster = Some(curr);
        }
        self.write_fat(&fat)?;
        let top = top_cluster.expect("unreachable");
        self.create_entry(&fname,attributes,top)
    }
    /// Free the file's chain and mark its directory slot deleted.
    pub fn delete_file(&mut self,name: &str) -> STDRESULT {
        let entry = self.lookup(name)?;
        let (chain,_last) = self.trace_chain(entry.top_cluster)?;
        self.delete_chain(&chain)?;
        self.delete_entry(entry.dir_idx)
    }
    /// Logical format: IPL sector (`BRA *`), disk id sector, fresh FAT, and
    /// an empty directory.  Sector level formatting is assumed done (see
    /// `img::Disk::blank`).
    pub fn format(&mut self) -> STDRESULT {
        let mut ipl = vec![0;SECTOR_SIZE];
        ipl[0] = 0x20;
        ipl[1] = 0xfe;
        self.disk.write_sector_lba(0,&ipl,0,0,0,false)?;

        let mut id = vec![0;SECTOR_SIZE];
        id[0..3].copy_from_slice(b"SYS");
        self.disk.write_sector_lba(2,&id,0,0,0,false)?;

        let mut fat = vec![FREE;SECTOR_SIZE];
        fat[0] = 0x00;
        self.write_fat(&fat)?;

        let empty = vec![0xff;SECTOR_SIZE];
        for sect_ofst in 0..DIR_SECTORS {
            self.disk.write_sector_lba(DIR_START_LBA + sect_ofst,&empty,0,0,0,false)?;
        }
        Ok(())
    }
}
