// test of the command line interface
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn makedisk_write_dir_read() {
    let dir = tempdir().expect("could not create temp directory");
    let img = dir.path().join("test.d77");
    let img_str = img.to_str().expect("bad path");

    // create a formatted container
    let mut cmd = Command::cargo_bin("fmkit").expect("no binary");
    cmd.args(["makedisk","-f",img_str]).assert().success();
    assert!(img.exists());

    // put a local file in, the extension carries the attributes
    let src = dir.path().join("HELLO.0BS");
    std::fs::write(&src,vec![0x41;100]).expect("could not write source");
    let mut cmd = Command::cargo_bin("fmkit").expect("no binary");
    cmd.args(["write","-f",img_str,"-s",src.to_str().expect("bad path")]).assert().success();

    // the directory lists it along with the free cluster count
    let mut cmd = Command::cargo_bin("fmkit").expect("no binary");
    cmd.args(["dir","-f",img_str,"-v"]).assert().success()
        .stdout(predicate::str::contains("HELLO"))
        .stdout(predicate::str::contains("151 Clusters Free"));

    // read it back out, padded to the sector boundary
    let out_stem = dir.path().join("out");
    let mut cmd = Command::cargo_bin("fmkit").expect("no binary");
    cmd.args(["read","-f",img_str,"-s","HELLO","-d",out_stem.to_str().expect("bad path")]).assert().success();
    let back = std::fs::read(dir.path().join("out.0BS")).expect("no output file");
    assert_eq!(back.len(),256);
    assert_eq!(back[0..100],vec![0x41;100][0..100]);
    assert!(back[100..].iter().all(|b| *b==0xff));
}

#[test]
fn read_missing_file_fails() {
    let dir = tempdir().expect("could not create temp directory");
    let img = dir.path().join("test.d77");
    let img_str = img.to_str().expect("bad path");
    let mut cmd = Command::cargo_bin("fmkit").expect("no binary");
    cmd.args(["makedisk","-f",img_str]).assert().success();
    let mut cmd = Command::cargo_bin("fmkit").expect("no binary");
    cmd.args(["read","-f",img_str,"-s","NOTHERE"]).assert().failure();
}

#[test]
fn source_and_index_are_exclusive() {
    let mut cmd = Command::cargo_bin("fmkit").expect("no binary");
    cmd.args(["read","-f","x.d77","-s","A","-i","0"]).assert().failure();
}
