use clap;

use super::RCH;
use crate::fs::fm;
use crate::img::d88;
use crate::STDRESULT;

pub fn makedisk(cmd: &clap::ArgMatches) -> STDRESULT {
    let img_path = cmd.get_one::<String>("file").expect(RCH);
    let mut image = d88::Image::new();
    image.append_blank_disk();
    {
        let disk = image.get_disk(0)?;
        let mut fs = fm::FileSystem::new(disk);
        fs.format()?;
    }
    let buf = image.to_bytes();
    eprintln!("writing {} bytes",buf.len());
    std::fs::write(img_path,&buf)?;
    Ok(())
}
