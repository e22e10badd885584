// test of the FM file system module
use fmkit::img::d88;
use fmkit::fs::fm;
use fmkit::fs::fm::types::FileAttributes;
use fmkit::fs::FileContents;

const BAS: FileAttributes = FileAttributes { file_type: 0, ascii_flag: 0, random_access_flag: 0 };

fn formatted_image() -> d88::Image {
    let mut image = d88::Image::new();
    image.append_blank_disk();
    let disk = image.get_disk(0).expect("no disk");
    let mut fs = fm::FileSystem::new(disk);
    fs.format().expect("format error");
    image
}

#[test]
fn address_arithmetic() {
    assert_eq!(fm::chr_to_lba(0,0,1),0);
    assert_eq!(fm::chr_to_lba(0,0,3),2);
    assert_eq!(fm::chr_to_lba(1,0,1),32);
    assert_eq!(fm::chr_to_lba(1,0,4),35);
    assert_eq!(fm::cluster_to_lba(0),64);
    assert_eq!(fm::lba_to_cluster(63),-1);
    assert_eq!(fm::lba_to_cluster(64),0);
    assert_eq!(fm::chr_to_cluster(1,1,16),-1);
    assert_eq!(fm::chr_to_cluster(2,0,1),0);
    assert_eq!(fm::lba_to_chr(32),[1,0,1]);
    assert_eq!(fm::cluster_to_chr(0),[2,0,1]);
    for lba in 0..1280 {
        let [c,h,r] = fm::lba_to_chr(lba);
        assert_eq!(fm::chr_to_lba(c,h,r),lba);
    }
    for lba in 64..1280 {
        let cluster = fm::lba_to_cluster(lba) as usize;
        let base = fm::cluster_to_lba(cluster);
        assert!(base <= lba && lba < base + 8);
    }
}

#[test]
fn format_leaves_mountable_disk() {
    let mut image = formatted_image();
    {
        let fs = fm::FileSystem::new(image.get_disk(0).expect("no disk"));
        assert!(fs.check_disk_id().expect("read error"));
        assert_eq!(fs.free_cluster_count().expect("read error"),152);
        let fat = fs.read_fat().expect("read error");
        assert_eq!(fat[0],0x00);
        assert!(fat[5..157].iter().all(|b| *b==0xff));
        assert_eq!(fs.valid_entries().expect("read error").len(),0);
    }
    // IPL carries the spin loop
    let disk = image.get_disk(0).expect("no disk");
    let ipl = disk.read_sector_lba(0).expect("read error");
    assert_eq!(ipl.data[0..2],[0x20,0xfe]);
    let id = disk.read_sector_lba(2).expect("read error");
    assert_eq!(id.data[0..3],*b"SYS");
}

#[test]
fn write_read_delete() {
    let mut image = formatted_image();
    let disk = image.get_disk(0).expect("no disk");
    let mut fs = fm::FileSystem::new(disk);
    let dat: Vec<u8> = (0..5120usize).map(|i| (i%251) as u8).collect();
    fs.write_file("TESTFILE",&dat,BAS,false).expect("write error");

    // 20 sectors = 2 full clusters + 4 in the last, directory slot 0
    let info = fs.lookup("TESTFILE").expect("lookup error");
    assert_eq!(info.top_cluster,0);
    assert_eq!(info.dir_idx,0);
    assert_eq!(info.num_sectors,20);
    let fat = fs.read_fat().expect("read error");
    assert_eq!(fat[5..8],[0x01,0x02,0xc3]);

    let (back,_info) = fs.read_file("TESTFILE").expect("read error");
    assert_eq!(back,dat);

    fs.delete_file("TESTFILE").expect("delete error");
    assert_eq!(fs.free_cluster_count().expect("read error"),152);
    assert!(fs.lookup("TESTFILE").is_err());
}

#[test]
fn full_last_cluster_encodes_c7() {
    let mut image = formatted_image();
    let disk = image.get_disk(0).expect("no disk");
    let mut fs = fm::FileSystem::new(disk);
    // 24 sectors fill three clusters exactly; the entry must still appear
    let dat = vec![0x11;6144];
    fs.write_file("BIG",&dat,BAS,false).expect("write error");
    let fat = fs.read_fat().expect("read error");
    assert_eq!(fat[5..8],[0x01,0x02,0xc7]);
    let info = fs.lookup("BIG").expect("lookup error");
    assert_eq!(info.num_sectors,24);
    let (back,_info) = fs.read_file("BIG").expect("read error");
    assert_eq!(back,dat);
}

#[test]
fn short_file_padded_with_ff() {
    let mut image = formatted_image();
    let disk = image.get_disk(0).expect("no disk");
    let mut fs = fm::FileSystem::new(disk);
    let dat = vec![0x41;100];
    fs.write_file("SHORT",&dat,BAS,false).expect("write error");
    let (back,info) = fs.read_file("SHORT").expect("read error");
    assert_eq!(back.len(),256);
    assert_eq!(back[0..100],dat[0..100]);
    assert!(back[100..].iter().all(|b| *b==0xff));
    assert_eq!(info.num_sectors,1);
    let fat = fs.read_fat().expect("read error");
    assert_eq!(fat[5],0xc0);
}

#[test]
fn delete_middle_of_three() {
    let mut image = formatted_image();
    let disk = image.get_disk(0).expect("no disk");
    let mut fs = fm::FileSystem::new(disk);
    let a: Vec<u8> = vec![0xaa;5120];
    let b: Vec<u8> = vec![0xbb;5120];
    let c: Vec<u8> = vec![0xcc;5120];
    fs.write_file("AAA",&a,BAS,false).expect("write error");
    fs.write_file("BBB",&b,BAS,false).expect("write error");
    fs.write_file("CCC",&c,BAS,false).expect("write error");
    assert_eq!(fs.free_cluster_count().expect("read error"),152-9);

    fs.delete_file("BBB").expect("delete error");
    assert_eq!(fs.free_cluster_count().expect("read error"),152-6);
    let fat = fs.read_fat().expect("read error");
    assert_eq!(fat[8..11],[0xff,0xff,0xff]);
    assert!(fs.lookup("BBB").is_err());

    let (back_a,_) = fs.read_file("AAA").expect("read error");
    let (back_c,_) = fs.read_file("CCC").expect("read error");
    assert_eq!(back_a,a);
    assert_eq!(back_c,c);
}

#[test]
fn overwrite_flag() {
    let mut image = formatted_image();
    let disk = image.get_disk(0).expect("no disk");
    let mut fs = fm::FileSystem::new(disk);
    fs.write_file("PROG",&vec![1;256],BAS,false).expect("write error");
    match fs.write_file("PROG",&vec![2;256],BAS,false) {
        Ok(()) => panic!("expected already-exists error"),
        Err(e) => assert_eq!(e.to_string(),"File already exists")
    }
    fs.write_file("PROG",&vec![2;256],BAS,true).expect("write error");
    let (back,_) = fs.read_file("PROG").expect("read error");
    assert_eq!(back,vec![2;256]);
}

#[test]
fn name_handling() {
    let mut image = formatted_image();
    let disk = image.get_disk(0).expect("no disk");
    let mut fs = fm::FileSystem::new(disk);
    fs.write_file("AB",&vec![0;256],BAS,false).expect("write error");
    // trailing spaces are insignificant on either side
    assert!(fs.lookup("AB   ").is_ok());
    assert!(fs.lookup("ab").is_err());
    // length limits
    assert!(fs.write_file("",&vec![0;256],BAS,false).is_err());
    assert!(fs.write_file("LONGNAME9",&vec![0;256],BAS,false).is_err());
}

#[test]
fn bad_attributes_rejected() {
    let mut image = formatted_image();
    let disk = image.get_disk(0).expect("no disk");
    let mut fs = fm::FileSystem::new(disk);
    let bad = FileAttributes::new(3,0x00,0x00);
    assert!(fs.write_file("X",&vec![0;256],bad,false).is_err());
    let bad = FileAttributes::new(0,0x01,0x00);
    assert!(fs.write_file("X",&vec![0;256],bad,false).is_err());
}

#[test]
fn deleted_slot_reused() {
    let mut image = formatted_image();
    let disk = image.get_disk(0).expect("no disk");
    let mut fs = fm::FileSystem::new(disk);
    fs.write_file("AAA",&vec![1;256],BAS,false).expect("write error");
    fs.write_file("BBB",&vec![2;256],BAS,false).expect("write error");
    fs.delete_file("AAA").expect("delete error");
    // slot 0 was marked deleted (0x00), it is overwritable
    fs.write_file("CCC",&vec![3;256],BAS,false).expect("write error");
    assert_eq!(fs.lookup("CCC").expect("lookup error").dir_idx,0);
}

#[test]
fn disk_full() {
    let mut image = formatted_image();
    let disk = image.get_disk(0).expect("no disk");
    let mut fs = fm::FileSystem::new(disk);
    // one byte over the 152 cluster capacity
    let dat = vec![0;152*8*256+1];
    match fs.write_file("HOG",&dat,BAS,false) {
        Ok(()) => panic!("expected disk-full error"),
        Err(e) => assert_eq!(e.to_string(),"Disk full")
    }
}

#[test]
fn directory_full() {
    let mut image = formatted_image();
    let disk = image.get_disk(0).expect("no disk");
    let mut fs = fm::FileSystem::new(disk);
    for i in 0..224 {
        let name = format!("F{:03}",i);
        let mut fname = [b' ';8];
        fname[0..4].copy_from_slice(name.as_bytes());
        fs.create_entry(&fname,BAS,0).expect("create error");
    }
    match fs.create_entry(b"OVERFLOW",BAS,0) {
        Ok(()) => panic!("expected directory-full error"),
        Err(e) => assert_eq!(e.to_string(),"Directory full")
    }
}

#[test]
fn corrupt_fat_detected() {
    let mut image = formatted_image();
    let disk = image.get_disk(0).expect("no disk");
    let mut fs = fm::FileSystem::new(disk);
    // cycle 0 -> 1 -> 0 never reaches a terminator
    let mut fat = fs.read_fat().expect("read error");
    fat[5] = 1;
    fat[6] = 0;
    fs.write_fat(&fat).expect("write error");
    assert!(fs.trace_chain(0).is_err());
    // reserved terminators 0xC8..=0xCF are not valid
    fat[6] = 0xc8;
    fs.write_fat(&fat).expect("write error");
    assert!(fs.trace_chain(0).is_err());
    // a free head is not an error, it reports an empty chain
    let (chain,last) = fs.trace_chain(100).expect("trace error");
    assert_eq!(chain.len(),0);
    assert_eq!(last,-1);
}

#[test]
fn empty_tail_terminator() {
    let mut image = formatted_image();
    let disk = image.get_disk(0).expect("no disk");
    let mut fs = fm::FileSystem::new(disk);
    let mut fat = fs.read_fat().expect("read error");
    fat[5] = 1;
    fat[6] = 0xfd;
    fs.write_fat(&fat).expect("write error");
    let (chain,last) = fs.trace_chain(0).expect("trace error");
    assert_eq!(chain,vec![0,1]);
    assert_eq!(last,0);
}

#[test]
fn extract_basic_wrappers() {
    // unprotected: id, UNLIST little-endian, tokens, 00 00 00 1A
    let file: Vec<u8> = [vec![0xff,0x0a,0x00],vec![0x26,0x07,0x00,0x0a,0x81],vec![0x00,0x00,0x00,0x1a],vec![0xff;16]].concat();
    match fm::pack::extract_contents(&file,0,0x00) {
        FileContents::BasicTokens { tokens, unlist } => {
            assert_eq!(tokens,vec![0x26,0x07,0x00,0x0a,0x81]);
            assert_eq!(unlist,10);
        },
        _ => panic!("wrapper not recognized")
    }
    // protected: id, UNLIST big-endian, tokens run to the first EOF byte
    let file: Vec<u8> = [vec![0xfe,0x00,0x0a],vec![0x26,0x07,0x00,0x0a,0x81,0x00,0x00,0x00],vec![0x1a]].concat();
    match fm::pack::extract_contents(&file,0,0x00) {
        FileContents::BasicTokensProtected { tokens, unlist } => {
            assert_eq!(tokens,vec![0x26,0x07,0x00,0x0a,0x81,0x00,0x00,0x00]);
            assert_eq!(unlist,10);
        },
        _ => panic!("wrapper not recognized")
    }
}

#[test]
fn extract_machine_code() {
    let file: Vec<u8> = [
        vec![0x00,0x00,0x04,0x10,0x00],
        vec![0x7e,0x10,0x03,0x39],
        vec![0xff,0x00,0x00,0x30,0x00,0x1a],
        vec![0xff;8]
    ].concat();
    match fm::pack::extract_contents(&file,2,0x00) {
        FileContents::MachineCode { data, load_address, entry_address } => {
            assert_eq!(data,vec![0x7e,0x10,0x03,0x39]);
            assert_eq!(load_address,0x1000);
            assert_eq!(entry_address,0x3000);
        },
        _ => panic!("wrapper not recognized")
    }
}

#[test]
fn extract_ascii_and_unsupported() {
    let file = b"10 PRINT\r\n\x1a\xff\xff".to_vec();
    match fm::pack::extract_contents(&file,0,0xff) {
        FileContents::Ascii(text) => assert_eq!(text,b"10 PRINT\r\n".to_vec()),
        _ => panic!("wrapper not recognized")
    }
    // BASIC data files have no recognized framing
    assert!(matches!(fm::pack::extract_contents(&file,1,0x00),FileContents::Unsupported));
    // bad id byte
    assert!(matches!(fm::pack::extract_contents(&[0x55;32],0,0x00),FileContents::Unsupported));
}

#[test]
fn image_survives_fs_round_trip() {
    let mut image = formatted_image();
    {
        let disk = image.get_disk(0).expect("no disk");
        let mut fs = fm::FileSystem::new(disk);
        fs.write_file("KEEP",&vec![0x77;1024],BAS,false).expect("write error");
    }
    let bytes = image.to_bytes();
    let mut image2 = d88::Image::from_bytes(&bytes).expect("parse error");
    let disk = image2.get_disk(0).expect("no disk");
    let fs = fm::FileSystem::new(disk);
    let (back,info) = fs.read_file("KEEP").expect("read error");
    assert_eq!(back,vec![0x77;1024]);
    assert_eq!(info.num_sectors,4);
}
