use clap;
use std::str::FromStr;
use base64::{engine::general_purpose::STANDARD as BASE64,Engine as _};
use log::info;

use super::{CommandError,RCH};
use crate::fs::fm;
use crate::fs::fm::pack;
use crate::fs::FileContents;
use crate::lang::fbasic::charset;
use crate::lang::fbasic::detokenizer::Detokenizer;
use crate::srec::Srec;
use crate::STDRESULT;

pub fn read(cmd: &clap::ArgMatches) -> STDRESULT {
    let img_path = cmd.get_one::<String>("file").expect(RCH);
    let image_number = usize::from_str(cmd.get_one::<String>("image_number").expect(RCH))?;
    let verbose = cmd.get_flag("verbose");
    let mut image = crate::open_image(img_path)?;
    let disk = image.get_disk(image_number)?;
    let fs = fm::FileSystem::new(disk);

    let (dat,entry) = match (cmd.get_one::<String>("source"),cmd.get_one::<String>("index")) {
        (Some(name),_) => fs.read_file(name)?,
        (_,Some(idx)) => fs.read_file_by_index(usize::from_str(idx)?)?,
        _ => return Err(Box::new(CommandError::InvalidCommand))
    };
    if verbose {
        info!("read {} ({} sectors)",entry.name_string(),entry.num_sectors);
        if atty::is(atty::Stream::Stdout) {
            crate::display_block(0,&dat);
        }
    }
    let stem = match cmd.get_one::<String>("destination") {
        Some(d) => d.to_string(),
        None => entry.name_string()
    };

    if cmd.get_flag("decode_basic") {
        let text = match pack::extract_contents(&dat,entry.file_type,entry.ascii_flag) {
            FileContents::BasicTokens { tokens, unlist } |
            FileContents::BasicTokensProtected { tokens, unlist } => {
                info!("UNLIST line number is {}",unlist);
                Detokenizer::new().detokenize(&tokens)?
            },
            FileContents::Ascii(raw) => charset::to_string(&raw),
            _ => {
                log::error!("{} does not hold BASIC source",entry.name_string());
                return Err(Box::new(CommandError::UnsupportedItemType));
            }
        };
        if !text.ends_with("\n") {
            log::warn!("program text ended without a newline");
        }
        std::fs::write(format!("{}.txt",stem),text)?;
        return Ok(());
    }
    if cmd.get_flag("srecord") {
        match pack::extract_contents(&dat,entry.file_type,entry.ascii_flag) {
            FileContents::MachineCode { data, load_address, entry_address } => {
                let mut srec = Srec::new();
                srec.add_block(load_address as usize,&data);
                srec.set_entry_address(entry_address as usize);
                std::fs::write(format!("{}.mot",stem),srec.encode()?)?;
                return Ok(());
            },
            _ => {
                log::error!("{} does not hold machine code",entry.name_string());
                return Err(Box::new(CommandError::UnsupportedItemType));
            }
        }
    }
    if cmd.get_flag("json") {
        let obj = json::object! {
            file_name: entry.name_string(),
            attributes: entry.attributes().to_tag(),
            top_cluster: entry.top_cluster,
            num_sectors: entry.num_sectors,
            data: BASE64.encode(&dat)
        };
        std::fs::write(format!("{}.json",stem),json::stringify_pretty(obj,4))?;
        return Ok(());
    }
    // raw payload, file attributes become the extension
    std::fs::write(format!("{}.{}",stem,entry.attributes().to_tag()),&dat)?;
    Ok(())
}
