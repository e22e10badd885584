//! # Motorola S-record module
//!
//! Generic helper for moving machine code in and out of the image as
//! S-records.  The buffer accumulates scattered byte writes; encoding emits
//! an optional S0 header, S1 data records, and an S9 entry record.
//! Decoding accepts S0-S3 and S7-S9, verifying the one's-complement
//! checksum of every line.

use crate::DYNERR;

/// Enumerates S-record errors.  The `Display` trait will print the equivalent long message.
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("S-record line {0} is malformed")]
    Malformed(usize),
    #[error("checksum mismatch in S-record line {0}")]
    Checksum(usize),
    #[error("unsupported record type in line {0}")]
    RecordType(usize),
    #[error("no data records found")]
    NoData
}

/// address field length by record type
const ADDRESS_BYTES: [usize;10] = [2,2,3,4,0,2,3,4,3,2];

pub struct Srec {
    buffer: Vec<u8>,
    top_address: usize,
    bottom_address: usize,
    header: Option<Vec<u8>>,
    entry_address: Option<usize>,
    /// data bytes per emitted record
    pub record_size: usize
}

impl Srec {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            top_address: usize::MAX,
            bottom_address: 0,
            header: None,
            entry_address: None,
            record_size: 16
        }
    }
    pub fn set_header(&mut self,dat: &[u8]) {
        self.header = Some(dat.to_vec());
    }
    pub fn set_entry_address(&mut self,address: usize) {
        self.entry_address = Some(address);
    }
    /// Put one byte at an address, growing the buffer as needed.
    pub fn add_data(&mut self,address: usize,byte: u8) {
        if self.buffer.len() <= address {
            self.buffer.resize(address+1,0);
        }
        self.buffer[address] = byte;
        if self.bottom_address < address {
            self.bottom_address = address;
        }
        if self.top_address > address {
            self.top_address = address;
        }
    }
    /// Load a whole block at an address, the usual case for machine code files.
    pub fn add_block(&mut self,address: usize,dat: &[u8]) {
        for (i,byte) in dat.iter().enumerate() {
            self.add_data(address+i,*byte);
        }
    }
    /// Render one S-record line including the checksum and newline.
    fn generate_record(record_type: usize,address: usize,payload: &[u8]) -> String {
        let address_bytes = ADDRESS_BYTES[record_type];
        let mut srecord = format!("S{}",record_type);
        let num_bytes = address_bytes + payload.len() + 1;
        srecord += &format!("{:02X}",num_bytes);
        let full_addr = format!("{:08X}",address);
        srecord += &full_addr[full_addr.len()-2*address_bytes..];
        for byte in payload {
            srecord += &format!("{:02X}",byte);
        }
        let mut sum = num_bytes;
        for i in 0..address_bytes {
            sum += (address >> (i*8)) & 0xff;
        }
        for byte in payload {
            sum += *byte as usize;
        }
        srecord += &format!("{:02X}\n",!sum & 0xff);
        srecord
    }
    /// Encode the buffer contents as S-record text.
    pub fn encode(&self) -> Result<String,DYNERR> {
        if self.top_address > self.bottom_address {
            return Err(Box::new(Error::NoData));
        }
        let mut srecords = String::new();
        if let Some(header) = &self.header {
            srecords += &Self::generate_record(0,0,header);
        }
        let mut addr = self.top_address;
        while addr <= self.bottom_address {
            let end = usize::min(addr + self.record_size,self.bottom_address + 1);
            srecords += &Self::generate_record(1,addr,&self.buffer[addr..end]);
            addr = end;
        }
        if let Some(entry) = self.entry_address {
            srecords += &Self::generate_record(9,entry,&[]);
        }
        Ok(srecords)
    }
    /// Decode one line.  Lines that do not look like S-records at all come
    /// back as None and are skipped; bad hex, bad length, or a checksum
    /// mismatch is an error naming the line.
    fn decode_record(line: &str,line_num: usize) -> Result<Option<(usize,usize,Vec<u8>)>,Error> {
        let record = line.trim_end();
        if record.len() < 5 || !record.starts_with('S') {
            return Ok(None);
        }
        let hex_field = |beg: usize,end: usize| -> Result<usize,Error> {
            match record.get(beg..end) {
                Some(s) => usize::from_str_radix(s,16).map_err(|_| Error::Malformed(line_num)),
                None => Err(Error::Malformed(line_num))
            }
        };
        let record_type = match record.as_bytes()[1] {
            d if d.is_ascii_digit() => (d - b'0') as usize,
            _ => return Err(Error::Malformed(line_num))
        };
        let num_bytes = hex_field(2,4)?;
        let address_bytes = ADDRESS_BYTES[record_type];
        if num_bytes < address_bytes + 1 {
            return Err(Error::Malformed(line_num));
        }
        let num_data = num_bytes - address_bytes - 1;
        let data_offset = 4 + address_bytes*2;
        let csum_offset = data_offset + num_data*2;
        if record.len() < csum_offset + 2 {
            return Err(Error::Malformed(line_num));
        }
        let address = hex_field(4,4+address_bytes*2)?;
        let mut sum = num_bytes;
        for i in 0..address_bytes {
            sum += (address >> (i*8)) & 0xff;
        }
        let mut payload: Vec<u8> = Vec::new();
        for i in 0..num_data {
            let byte = hex_field(data_offset+i*2,data_offset+i*2+2)?;
            payload.push(byte as u8);
            sum += byte;
        }
        let true_sum = hex_field(csum_offset,csum_offset+2)?;
        if !sum & 0xff != true_sum {
            return Err(Error::Checksum(line_num));
        }
        Ok(Some((record_type,address,payload)))
    }
    /// Decode S-record text into (load address, data, entry address).
    pub fn decode(&mut self,srecords: &str) -> Result<(usize,Vec<u8>,Option<usize>),DYNERR> {
        self.buffer = Vec::new();
        self.top_address = usize::MAX;
        self.bottom_address = 0;
        self.entry_address = None;
        for (line_num,line) in srecords.lines().enumerate() {
            let (record_type,address,payload) = match Self::decode_record(line,line_num+1)? {
                Some(rec) => rec,
                None => continue
            };
            match record_type {
                0 => self.header = Some(payload),
                1 | 2 | 3 => {
                    for (pos,byte) in payload.iter().enumerate() {
                        self.add_data(address+pos,*byte);
                    }
                },
                7 | 8 | 9 => self.entry_address = Some(address),
                _ => return Err(Box::new(Error::RecordType(line_num+1)))
            }
        }
        if self.top_address > self.bottom_address {
            return Err(Box::new(Error::NoData));
        }
        let data = self.buffer[self.top_address..=self.bottom_address].to_vec();
        Ok((self.top_address,data,self.entry_address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_simple() {
        let mut srec = Srec::new();
        srec.add_block(0x1000,&[0x7e,0x10,0x03,0x39]);
        srec.set_entry_address(0x1000);
        let txt = srec.encode().expect("encode error");
        assert_eq!(txt,"S1071000 7E100339 1E\nS9031000EC\n".replace(' ',""));
    }
    #[test]
    fn round_trip() {
        let mut srec = Srec::new();
        srec.set_header(b"HDR");
        srec.add_block(0x0200,&(0u8..40u8).collect::<Vec<u8>>());
        srec.set_entry_address(0x0203);
        let txt = srec.encode().expect("encode error");
        let mut decoder = Srec::new();
        let (addr,data,entry) = decoder.decode(&txt).expect("decode error");
        assert_eq!(addr,0x0200);
        assert_eq!(data,(0u8..40u8).collect::<Vec<u8>>());
        assert_eq!(entry,Some(0x0203));
    }
    #[test]
    fn checksum_mismatch() {
        let mut srec = Srec::new();
        // last byte of the first line should be 0x31
        let txt = "S10710007E10033930\nS9031000EC\n";
        match srec.decode(txt) {
            Ok(_) => panic!("expected checksum error"),
            Err(e) => assert_eq!(e.to_string(),"checksum mismatch in S-record line 1")
        }
    }
    #[test]
    fn non_record_lines_skipped() {
        let mut srec = Srec::new();
        let txt = "; comment\nS1071000 7E100339 1E\n".replace(' ',"");
        let (addr,data,_entry) = srec.decode(&txt).expect("decode error");
        assert_eq!(addr,0x1000);
        assert_eq!(data,vec![0x7e,0x10,0x03,0x39]);
    }
}
