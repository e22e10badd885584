use clap;
use std::str::FromStr;
use log::warn;

use super::RCH;
use crate::fs::fm;
use crate::STDRESULT;

pub fn dir(cmd: &clap::ArgMatches) -> STDRESULT {
    let img_path = cmd.get_one::<String>("file").expect(RCH);
    let image_number = usize::from_str(cmd.get_one::<String>("image_number").expect(RCH))?;
    let mut image = crate::open_image(img_path)?;
    let disk = image.get_disk(image_number)?;
    let fs = fm::FileSystem::new(disk);
    if !fs.check_disk_id()? {
        warn!("disk id sector does not look like a formatted disk");
    }
    for entry in fs.valid_entries()? {
        let tag: Vec<char> = entry.attributes().to_tag().chars().collect();
        if cmd.get_flag("original") {
            println!("{:3} {} {:8} {} {} {} {:3} {:4}",
                entry.dir_idx,hex::encode_upper(entry.name),entry.name_string(),
                tag[0],tag[1],tag[2],entry.top_cluster,entry.num_sectors);
        } else {
            println!("{:3} {:8} {} {} {} {:3} {:4}",
                entry.dir_idx,entry.name_string(),
                tag[0],tag[1],tag[2],entry.top_cluster,entry.num_sectors);
        }
    }
    if cmd.get_flag("verbose") {
        println!("{} Clusters Free",fs.free_cluster_count()?);
    }
    Ok(())
}
