//! # `fmkit` main library
//!
//! This library manipulates D88/D77 disk images for the FM series of 8-bit
//! microcomputers, from the level of raw sector records up to F-BASIC program listings.
//!
//! ## Architecture
//!
//! Operations are built around three layers:
//! * `img` encodes/decodes the D88/D77 container, does not try to interpret a file system
//! * `fs::fm` imposes the FM file system on the already decoded sector data
//! * `lang::fbasic` translates tokenized F-BASIC payloads back into source text
//!
//! A container (`img::d88::Image`) owns its disks.  A file system view
//! (`fs::fm::FileSystem`) borrows one disk and goes through the disk's sector
//! operations for everything; any changes are not permanent until the container
//! is saved to whatever file system is hosting fmkit.
//!
//! ## File System
//!
//! The FM file system divides the disk into 152 clusters of 8 sectors, mapped by a
//! single FAT sector, with a 224-entry directory.  Analogues of the F-BASIC disk
//! commands (FILES, LOAD, SAVE, KILL) are exposed as read/write/delete operations.
//!
//! ## Disk Images
//!
//! The D88/D77 container holds one or more disks, each with up to 164 tracks of
//! sector records carrying their own C/H/R/N identity and status metadata.
//! The codec preserves all of it bit-exactly.

pub mod img;
pub mod fs;
pub mod lang;
pub mod srec;
pub mod commands;

use log::info;
use lang::fbasic::charset;

type DYNERR = Box<dyn std::error::Error>;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

/// Save the container file (make changes permanent)
pub fn save_image(image: &img::d88::Image,img_path: &str) -> STDRESULT {
    std::fs::write(img_path,image.to_bytes())?;
    Ok(())
}

/// Parse a container from a file.  The extension is not examined; the header
/// is self-identifying enough for the only supported family (D88/D77).
pub fn open_image(img_path: &str) -> Result<img::d88::Image,DYNERR> {
    let buf = std::fs::read(img_path)?;
    let image = img::d88::Image::from_bytes(&buf)?;
    info!("parsed {} disk(s) from {}",image.disks.len(),img_path);
    Ok(image)
}

/// Display binary to stdout in columns of hex and half-width characters
pub fn display_block(start_addr: usize,block: &[u8]) {
    let mut slice_start = 0;
    while slice_start < block.len() {
        let row_label = start_addr + slice_start;
        let mut slice_end = slice_start + 16;
        if slice_end > block.len() {
            slice_end = block.len();
        }
        let slice = &block[slice_start..slice_end];
        print!("{:04X} : ",row_label);
        for byte in slice {
            print!("{:02X} ",byte);
        }
        for _blank in slice_end..slice_start+16 {
            print!("   ");
        }
        print!("|");
        for byte in slice {
            print!("{}",charset::to_display_char(*byte));
        }
        println!();
        slice_start += 16;
    }
}
