//! # Disk Image Module
//!
//! A D88/D77 container is represented by `d88::Image`, which owns an ordered
//! list of `Disk` objects.  Each `Disk` holds exactly 164 track slots; a slot
//! with no sectors means "no track recorded".  Sectors carry their own
//! C/H/R/N identity together with the track-wide sector count, density,
//! data mark, and the recorded FDC status.  The status byte is preserved
//! verbatim and never recomputed.
//!
//! ## Basic Functions
//!
//! The `Disk` object exposes sector reads and writes in three addressing
//! modes: by track number and C/H/R id, by linear block address, and by
//! index within the track.  These are distinct operations rather than one
//! operation with optional arguments.  The file system layer (`fs::fm`)
//! goes through these operations for everything it does.
//!
//! ## Relation to File Systems
//!
//! The codec is agnostic about the sector contents.  FAT and directory
//! sectors are just sectors whose payload the `fs` module interprets.

pub mod d88;

use a2kit_macro::{DiskStruct,DiskStructError};
use log::warn;
use crate::{STDRESULT,DYNERR};

/// Track slots in a D88 disk header.
pub const MAX_TRACKS: usize = 164;
/// Sectors per track for the standard 2D geometry.
pub const SECS_PER_TRACK: usize = 16;
/// Length of the fixed sector header preceding each payload.
pub const SECTOR_HEADER_SIZE: usize = 16;

/// Enumerates image-level errors.  The `Display` trait will print the equivalent long message.
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("image is truncated")]
    Truncated,
    #[error("image could not be interpreted")]
    Malformed,
    #[error("image slot out of range")]
    ImageNotFound,
    #[error("track request out of range")]
    TrackNotFound,
    #[error("sector not found")]
    SectorNotFound
}

/// One sector record: the fixed header fields plus the owned payload.
/// `data_size` is not stored; it is always the payload length.
pub struct Sector {
    /// position within the track, kept as a debugging hint only
    pub sect_idx: usize,
    pub c: u8,
    pub h: u8,
    pub r: u8,
    /// size code, payload length = 128 * 2^n
    pub n: u8,
    /// sector count of the containing track, replicated in every sector
    pub num_sectors: u16,
    /// 0x00 double density, 0x40 single
    pub density: u8,
    /// 0x00 normal, 0x10 deleted
    pub data_mark: u8,
    /// FDC status, carried verbatim
    pub status: u8,
    pub data: Vec<u8>
}

impl Sector {
    /// Fresh zero-filled sector with the given id and size code.
    pub fn blank(c: u8,h: u8,r: u8,n: u8) -> Self {
        Self {
            sect_idx: 0,
            c, h, r, n,
            num_sectors: 0,
            density: 0,
            data_mark: 0,
            status: 0,
            data: vec![0;128 << n as usize]
        }
    }
}

impl DiskStruct for Sector {
    fn new() -> Self {
        Self {
            sect_idx: 0,
            c: 0, h: 0, r: 0, n: 0,
            num_sectors: 0,
            density: 0,
            data_mark: 0,
            status: 0,
            data: Vec::new()
        }
    }
    fn len(&self) -> usize {
        SECTOR_HEADER_SIZE + self.data.len()
    }
    fn to_bytes(&self) -> Vec<u8> {
        let mut ans: Vec<u8> = Vec::new();
        ans.push(self.c);
        ans.push(self.h);
        ans.push(self.r);
        ans.push(self.n);
        ans.append(&mut u16::to_le_bytes(self.num_sectors).to_vec());
        ans.push(self.density);
        ans.push(self.data_mark);
        ans.push(self.status);
        ans.append(&mut vec![0;5]);
        ans.append(&mut u16::to_le_bytes(self.data.len() as u16).to_vec());
        ans.append(&mut self.data.clone());
        return ans;
    }
    /// Caller must have verified the slice holds the full header and payload,
    /// panics otherwise.  `d88::Image::from_bytes` does the verification.
    fn update_from_bytes(&mut self,bytes: &[u8]) -> Result<(),DiskStructError> {
        self.c = bytes[0];
        self.h = bytes[1];
        self.r = bytes[2];
        self.n = bytes[3];
        self.num_sectors = u16::from_le_bytes([bytes[4],bytes[5]]);
        self.density = bytes[6];
        self.data_mark = bytes[7];
        self.status = bytes[8];
        let data_size = u16::from_le_bytes([bytes[14],bytes[15]]) as usize;
        self.data = bytes[SECTOR_HEADER_SIZE..SECTOR_HEADER_SIZE+data_size].to_vec();
        Ok(())
    }
    fn from_bytes(bytes: &[u8]) -> Result<Self,DiskStructError> {
        let mut ans = Sector::new();
        ans.update_from_bytes(bytes)?;
        Ok(ans)
    }
}

/// One disk of a D88/D77 container.  The declared `disk_size` is never
/// stored; reconstruction recomputes it.
pub struct Disk {
    /// 16 name bytes plus the terminator
    pub name: [u8;17],
    pub write_protect: u8,
    pub disk_type: u8,
    /// always `MAX_TRACKS` slots, an empty vector is an unrecorded track
    pub tracks: Vec<Vec<Sector>>
}

/// If a payload is not a power of two in length, pad it with zeros up to the
/// next power of two (at least one official sector size, 128).
fn quantize_payload(dat: &[u8]) -> Vec<u8> {
    let mut target = dat.len().next_power_of_two();
    if target < 128 {
        target = 128;
    }
    if target != dat.len() {
        warn!("payload size rounded up to power of 2 ({} -> {})",dat.len(),target);
    }
    let mut padded = dat.to_vec();
    padded.resize(target,0);
    return padded;
}

impl Disk {
    /// Disk with all track slots empty.
    pub fn new() -> Self {
        Self {
            name: [0;17],
            write_protect: 0,
            disk_type: 0,
            tracks: (0..MAX_TRACKS).map(|_| Vec::new()).collect()
        }
    }
    /// Standard blank 2D disk: tracks up to `max_valid_track` get 16 fresh
    /// 256-byte sectors, the rest stay unrecorded.
    pub fn blank(max_valid_track: usize) -> Self {
        let mut ans = Self::new();
        ans.set_name("NEW IMAGE");
        for track in 0..MAX_TRACKS {
            if track <= max_valid_track {
                let c = (track/2) as u8;
                let h = (track%2) as u8;
                let mut sectors: Vec<Sector> = (1..=SECS_PER_TRACK as u8).map(|r| Sector::blank(c,h,r,1)).collect();
                Self::adjust_num_sectors(&mut sectors);
                Self::renumber_sect_idx(&mut sectors);
                ans.tracks[track] = sectors;
            }
        }
        return ans;
    }
    pub fn name_string(&self) -> String {
        let end = self.name.iter().position(|b| *b==0).unwrap_or(16);
        String::from_utf8_lossy(&self.name[0..end]).trim_end().to_string()
    }
    /// Set the disk name, truncating to 16 bytes if necessary.
    pub fn set_name(&mut self,name: &str) {
        self.name = [0;17];
        for (i,b) in name.bytes().take(16).enumerate() {
            self.name[i] = b;
        }
    }
    /// Make every sector of the track declare the track's actual sector count.
    fn adjust_num_sectors(track: &mut Vec<Sector>) {
        let num = track.len() as u16;
        for sect in track.iter_mut() {
            sect.num_sectors = num;
        }
    }
    fn renumber_sect_idx(track: &mut Vec<Sector>) {
        for (idx,sect) in track.iter_mut().enumerate() {
            sect.sect_idx = idx;
        }
    }
    fn track_ref(&self,track: usize) -> Result<&Vec<Sector>,DYNERR> {
        match self.tracks.get(track) {
            Some(t) => Ok(t),
            None => Err(Box::new(Error::TrackNotFound))
        }
    }
    /// Read a sector, matching on the C/H/R id.  When `ignore_ch` is true only
    /// the record number R has to match, which is how the file system reads.
    pub fn read_sector(&self,track: usize,id: [u8;3],ignore_ch: bool) -> Result<&Sector,DYNERR> {
        let [c,h,r] = id;
        for sect in self.track_ref(track)? {
            let matched = match ignore_ch {
                true => sect.r==r,
                false => sect.c==c && sect.h==h && sect.r==r
            };
            if matched {
                return Ok(sect);
            }
        }
        Err(Box::new(Error::SectorNotFound))
    }
    /// Read a sector by linear block address; LBA 0 is CHR (0,0,1).
    pub fn read_sector_lba(&self,lba: usize) -> Result<&Sector,DYNERR> {
        let (track,id) = lba_to_track_id(lba);
        self.read_sector(track,id,true)
    }
    /// Read a sector by its position within the track.
    pub fn read_sector_idx(&self,track: usize,sect_idx: usize) -> Result<&Sector,DYNERR> {
        let sectors = self.track_ref(track)?;
        let num_sectors = match sectors.first() {
            Some(s) => s.num_sectors as usize,
            None => return Err(Box::new(Error::SectorNotFound))
        };
        if sect_idx < num_sectors && sect_idx < sectors.len() {
            return Ok(&sectors[sect_idx]);
        }
        Err(Box::new(Error::SectorNotFound))
    }
    fn find_sector_mut(&mut self,track: usize,id: [u8;3],ignore_ch: bool) -> Option<&mut Sector> {
        let [c,h,r] = id;
        for sect in self.tracks.get_mut(track)? {
            let matched = match ignore_ch {
                true => sect.r==r,
                false => sect.c==c && sect.h==h && sect.r==r
            };
            if matched {
                return Some(sect);
            }
        }
        None
    }
    /// Write a sector, matching on the C/H/R id.  An existing sector keeps its
    /// id, size code, position, and the track sector count; payload, density,
    /// data mark, and status are replaced.  A missing sector is appended only
    /// when `create_new` is set, deriving the size code from the payload and
    /// re-establishing the track invariants.
    pub fn write_sector(&mut self,track: usize,id: [u8;3],dat: &[u8],density: u8,data_mark: u8,status: u8,ignore_ch: bool,create_new: bool) -> STDRESULT {
        if track >= self.tracks.len() {
            return Err(Box::new(Error::TrackNotFound));
        }
        let padded = quantize_payload(dat);
        if let Some(sect) = self.find_sector_mut(track,id,ignore_ch) {
            sect.data = padded;
            sect.density = density;
            sect.data_mark = data_mark;
            sect.status = status;
            return Ok(());
        }
        if create_new {
            let [c,h,r] = id;
            let n = (padded.len().trailing_zeros() - 7) as u8;
            let mut sect = Sector::blank(c,h,r,n);
            sect.data = padded;
            sect.density = density;
            sect.data_mark = data_mark;
            sect.status = status;
            self.tracks[track].push(sect);
            Self::adjust_num_sectors(&mut self.tracks[track]);
            Self::renumber_sect_idx(&mut self.tracks[track]);
            return Ok(());
        }
        Err(Box::new(Error::SectorNotFound))
    }
    /// Write a sector by linear block address; LBA 0 is CHR (0,0,1).
    pub fn write_sector_lba(&mut self,lba: usize,dat: &[u8],density: u8,data_mark: u8,status: u8,create_new: bool) -> STDRESULT {
        let (track,id) = lba_to_track_id(lba);
        self.write_sector(track,id,dat,density,data_mark,status,true,create_new)
    }
    /// Write a sector by its position within the track.
    pub fn write_sector_idx(&mut self,track: usize,sect_idx: usize,dat: &[u8],density: u8,data_mark: u8,status: u8) -> STDRESULT {
        self.read_sector_idx(track,sect_idx)?;
        let padded = quantize_payload(dat);
        let sect = &mut self.tracks[track][sect_idx];
        sect.data = padded;
        sect.density = density;
        sect.data_mark = data_mark;
        sect.status = status;
        Ok(())
    }
}

/// Split an LBA into the track number and the C/H/R id of the sector.
pub fn lba_to_track_id(lba: usize) -> (usize,[u8;3]) {
    let track = lba / SECS_PER_TRACK;
    let c = (track/2) as u8;
    let h = (track%2) as u8;
    let r = (lba % SECS_PER_TRACK + 1) as u8;
    (track,[c,h,r])
}
