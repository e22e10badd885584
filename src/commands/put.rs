use clap;
use std::str::FromStr;
use std::path::Path;
use log::info;

use super::{CommandError,RCH};
use crate::fs::fm;
use crate::fs::fm::types::FileAttributes;
use crate::STDRESULT;

pub fn write(cmd: &clap::ArgMatches) -> STDRESULT {
    let img_path = cmd.get_one::<String>("file").expect(RCH);
    let image_number = usize::from_str(cmd.get_one::<String>("image_number").expect(RCH))?;
    let src_path = cmd.get_one::<String>("source").expect(RCH);

    let src = Path::new(src_path);
    let ext = match src.extension() {
        Some(e) => e.to_string_lossy().to_string(),
        None => {
            log::error!("source file needs an attribute extension such as `.0BS`");
            return Err(Box::new(CommandError::UnknownFormat));
        }
    };
    let attributes = FileAttributes::from_str(&ext)?;
    let name = match src.file_stem() {
        Some(stem) => stem.to_string_lossy().trim_end().to_string(),
        None => return Err(Box::new(CommandError::InvalidCommand))
    };
    let dat = std::fs::read(src)?;

    let mut image = crate::open_image(img_path)?;
    {
        let disk = image.get_disk(image_number)?;
        let mut fs = fm::FileSystem::new(disk);
        fs.write_file(&name,&dat,attributes,true)?;
    }
    info!("wrote {} bytes as {}",dat.len(),name);
    crate::save_image(&image,img_path)
}
