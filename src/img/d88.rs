//! # Support for D88/D77 containers
//!
//! The container is an ordered sequence of disks concatenated in a single
//! blob, each disk self-delimiting through the `disk_size` field of its
//! header.  A disk is a fixed 32-byte header, a 164-entry track offset
//! table, and a body of track regions holding the sector records.
//!
//! Reconstruction recomputes all offsets and the disk size; everything else
//! round-trips bit-exactly, including sector status bytes and unrecorded
//! track slots (the only loss is zero-sized trailing track regions, which
//! have no representation of their own).

use a2kit_macro::{DiskStruct,DiskStructError};
use a2kit_macro_derive::DiskStruct;
use base64::{engine::general_purpose::STANDARD as BASE64,Engine as _};
use log::{warn,debug};
use json;
use crate::img;
use crate::img::{Disk,Sector,Error,MAX_TRACKS,SECTOR_HEADER_SIZE};
use crate::DYNERR;

const HEADER_SIZE: usize = 32;
const TRACK_TABLE_SIZE: usize = MAX_TRACKS * 4;
/// offset of the `disk_size` field within the disk header
const DISK_SIZE_OFFSET: usize = 0x1c;

#[derive(DiskStruct)]
struct DiskHeader {
    name: [u8;17],
    pad1: [u8;9],
    write_protect: u8,
    disk_type: u8,
    disk_size: [u8;4]
}

/// A D88/D77 container: one or more disks in a single blob.
pub struct Image {
    pub disks: Vec<Disk>
}

/// Parse one track region into sector records.
fn parse_sectors(region: &[u8]) -> Result<Vec<Sector>,DYNERR> {
    let mut sectors: Vec<Sector> = Vec::new();
    let mut ptr = 0;
    while ptr < region.len() {
        if region.len() - ptr < SECTOR_HEADER_SIZE {
            return Err(Box::new(Error::Truncated));
        }
        let data_size = u16::from_le_bytes([region[ptr+14],region[ptr+15]]) as usize;
        if region.len() - ptr < SECTOR_HEADER_SIZE + data_size {
            return Err(Box::new(Error::Truncated));
        }
        let mut sect = Sector::from_bytes(&region[ptr..ptr+SECTOR_HEADER_SIZE+data_size])?;
        sect.sect_idx = sectors.len();
        ptr += sect.len();
        sectors.push(sect);
    }
    Ok(sectors)
}

/// Parse one disk starting at the head of `buf`, returning the disk and the
/// count of bytes it claims.
fn parse_disk(buf: &[u8]) -> Result<(Disk,usize),DYNERR> {
    if buf.len() < HEADER_SIZE + TRACK_TABLE_SIZE {
        return Err(Box::new(Error::Truncated));
    }
    let header = DiskHeader::from_bytes(&buf[0..HEADER_SIZE])?;
    let disk_size = u32::from_le_bytes(header.disk_size) as usize;
    if disk_size < HEADER_SIZE + TRACK_TABLE_SIZE || disk_size > buf.len() {
        return Err(Box::new(Error::Truncated));
    }
    let disk_buf = &buf[0..disk_size];
    let mut table = [0;MAX_TRACKS];
    for track in 0..MAX_TRACKS {
        let i = HEADER_SIZE + track*4;
        table[track] = u32::from_le_bytes([disk_buf[i],disk_buf[i+1],disk_buf[i+2],disk_buf[i+3]]) as usize;
    }
    let mut disk = Disk::new();
    disk.name = header.name;
    disk.write_protect = header.write_protect;
    disk.disk_type = header.disk_type;
    for track in 0..MAX_TRACKS {
        let beg = table[track];
        if beg == 0 {
            continue;
        }
        // region ends at the next recorded track, or at the end of the disk
        let end = table[track+1..].iter().find(|off| **off > 0).copied().unwrap_or(disk_size);
        if beg >= disk_size || end < beg || end > disk_size {
            warn!("track {} offsets are not monotone ({}..{}), treating track as empty",track,beg,end);
            continue;
        }
        disk.tracks[track] = parse_sectors(&disk_buf[beg..end])?;
        debug!("track {}: {} sectors",track,disk.tracks[track].len());
    }
    Ok((disk,disk_size))
}

impl Disk {
    /// Flatten this disk into its D88 byte layout, recomputing the track
    /// offset table and the declared disk size.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut track_table: Vec<u8> = Vec::new();
        let mut body: Vec<u8> = Vec::new();
        for track in &self.tracks {
            if track.len() > 0 {
                let beg = HEADER_SIZE + TRACK_TABLE_SIZE + body.len();
                track_table.append(&mut u32::to_le_bytes(beg as u32).to_vec());
                for sect in track {
                    body.append(&mut sect.to_bytes());
                }
            } else {
                track_table.append(&mut u32::to_le_bytes(0).to_vec());
            }
        }
        let header = DiskHeader {
            name: self.name,
            pad1: [0;9],
            write_protect: self.write_protect,
            disk_type: self.disk_type,
            disk_size: [0;4]
        };
        let mut ans = header.to_bytes();
        ans.append(&mut track_table);
        ans.append(&mut body);
        let total = u32::to_le_bytes(ans.len() as u32);
        ans[DISK_SIZE_OFFSET..DISK_SIZE_OFFSET+4].copy_from_slice(&total);
        return ans;
    }
    /// Flatten this disk into a JSON string for inspection or transport.
    /// Payloads are base64, or space-separated hex when `hex_dump` is set.
    /// `Disk::from_json` reverses this losslessly.
    pub fn to_json(&self,indent: Option<u16>,hex_dump: bool) -> String {
        let mut root = json::JsonValue::new_object();
        root["name"] = json::JsonValue::String(hex::encode_upper(self.name));
        root["write_protect"] = json::JsonValue::from(self.write_protect);
        root["disk_type"] = json::JsonValue::from(self.disk_type);
        root["encoding"] = json::JsonValue::String(match hex_dump {
            true => "hex".to_string(),
            false => "base64".to_string()
        });
        let mut track_ary = json::JsonValue::new_array();
        for track in &self.tracks {
            let mut sect_ary = json::JsonValue::new_array();
            for sect in track {
                let sect_data = match hex_dump {
                    true => sect.data.iter().map(|b| format!("{:02x}",b)).collect::<Vec<String>>().join(" "),
                    false => BASE64.encode(&sect.data)
                };
                let obj = json::object! {
                    sect_idx: sect.sect_idx,
                    C: sect.c,
                    H: sect.h,
                    R: sect.r,
                    N: sect.n,
                    num_sectors: sect.num_sectors,
                    density: sect.density,
                    data_mark: sect.data_mark,
                    status: sect.status,
                    data_size: sect.data.len(),
                    sect_data: sect_data
                };
                sect_ary.push(obj).expect("unreachable");
            }
            track_ary.push(sect_ary).expect("unreachable");
        }
        root["tracks"] = track_ary;
        match indent {
            Some(spaces) => json::stringify_pretty(root,spaces),
            None => json::stringify(root)
        }
    }
    /// Rebuild a disk from the JSON form written by `Disk::to_json`.
    pub fn from_json(json_str: &str) -> Result<Disk,DYNERR> {
        let parsed = json::parse(json_str)?;
        let mut disk = Disk::new();
        let name = match parsed["name"].as_str() {
            Some(s) => hex::decode(s)?,
            None => return Err(Box::new(Error::Malformed))
        };
        if name.len() != disk.name.len() {
            return Err(Box::new(Error::Malformed));
        }
        disk.name.copy_from_slice(&name);
        disk.write_protect = parsed["write_protect"].as_u8().ok_or(Error::Malformed)?;
        disk.disk_type = parsed["disk_type"].as_u8().ok_or(Error::Malformed)?;
        let hex_dump = match parsed["encoding"].as_str() {
            Some("hex") => true,
            Some("base64") => false,
            _ => return Err(Box::new(Error::Malformed))
        };
        if parsed["tracks"].len() != MAX_TRACKS {
            return Err(Box::new(Error::Malformed));
        }
        for (track_num,sect_ary) in parsed["tracks"].members().enumerate() {
            let mut sectors: Vec<Sector> = Vec::new();
            for obj in sect_ary.members() {
                let mut sect = Sector::new();
                sect.sect_idx = obj["sect_idx"].as_usize().ok_or(Error::Malformed)?;
                sect.c = obj["C"].as_u8().ok_or(Error::Malformed)?;
                sect.h = obj["H"].as_u8().ok_or(Error::Malformed)?;
                sect.r = obj["R"].as_u8().ok_or(Error::Malformed)?;
                sect.n = obj["N"].as_u8().ok_or(Error::Malformed)?;
                sect.num_sectors = obj["num_sectors"].as_u16().ok_or(Error::Malformed)?;
                sect.density = obj["density"].as_u8().ok_or(Error::Malformed)?;
                sect.data_mark = obj["data_mark"].as_u8().ok_or(Error::Malformed)?;
                sect.status = obj["status"].as_u8().ok_or(Error::Malformed)?;
                let dat_str = obj["sect_data"].as_str().ok_or(Error::Malformed)?;
                sect.data = match hex_dump {
                    true => hex::decode(dat_str.replace(' ',""))?,
                    false => BASE64.decode(dat_str)?
                };
                sectors.push(sect);
            }
            disk.tracks[track_num] = sectors;
        }
        Ok(disk)
    }
}

impl Image {
    /// Container with no disks; use `append_blank_disk` to populate.
    pub fn new() -> Self {
        Self {
            disks: Vec::new()
        }
    }
    /// Parse a container, consuming the whole blob.
    pub fn from_bytes(buf: &[u8]) -> Result<Self,DYNERR> {
        let mut ans = Self::new();
        let mut ptr = 0;
        while ptr < buf.len() {
            let (disk,disk_size) = parse_disk(&buf[ptr..])?;
            debug!("disk {} `{}` claims {} bytes",ans.disks.len(),disk.name_string(),disk_size);
            ans.disks.push(disk);
            ptr += disk_size;
        }
        Ok(ans)
    }
    /// Flatten the whole container.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut ans: Vec<u8> = Vec::new();
        for disk in &self.disks {
            ans.append(&mut disk.to_bytes());
        }
        return ans;
    }
    /// Append a fresh blank 2D disk (tracks 0..=79 recorded, the rest empty).
    /// The disk is not logically formatted; see `fs::fm::FileSystem::format`.
    pub fn append_blank_disk(&mut self) {
        self.disks.push(Disk::blank(79));
    }
    /// Borrow one disk of the container mutably, e.g. to attach a file system.
    pub fn get_disk(&mut self,image_number: usize) -> Result<&mut Disk,DYNERR> {
        let count = self.disks.len();
        match self.disks.get_mut(image_number) {
            Some(disk) => Ok(disk),
            None => {
                log::error!("image {} requested, container holds {}",image_number,count);
                Err(Box::new(img::Error::ImageNotFound))
            }
        }
    }
}
