use assert_cmd::prelude::*;
use std::process::Command;
use std::{env, fs, path::PathBuf};

const LOOP_IMAGE: &str = "\
00000000000 : 0000000010010101;
00000000001 : 0001000010000101;
00000000010 : 1010000010000000;
00000000011 : 0000000000000001;
00000000100 : 1001000000001100;
00000000101 : 0000000100000100;
00000000110 : 1011000100000001;
";

fn temp_dest(name: &str) -> PathBuf {
    let dest = env::temp_dir().join(name);
    let _ = fs::remove_file(&dest);
    dest
}

#[test]
fn runs_without_arguments() {
    let mut cmd = Command::cargo_bin("weft").unwrap();
    cmd.assert().success();
}

#[test]
fn assembles_loop_fixture() {
    let dest = temp_dest("weft_loop.mif");
    let mut cmd = Command::cargo_bin("weft").unwrap();
    cmd.arg("assemble").arg("tests/asm/loop.asm").arg(&dest);
    cmd.assert().success();
    assert_eq!(fs::read_to_string(&dest).unwrap(), LOOP_IMAGE);
}

#[test]
fn check_accepts_loop_fixture() {
    let mut cmd = Command::cargo_bin("weft").unwrap();
    cmd.arg("check").arg("tests/asm/loop.asm");
    cmd.assert().success();
}

#[test]
fn check_rejects_bad_fixture() {
    let mut cmd = Command::cargo_bin("weft").unwrap();
    cmd.arg("check").arg("tests/asm/bad.asm");
    cmd.assert().failure();
}

#[test]
fn no_image_written_on_error() {
    let dest = temp_dest("weft_bad.mif");
    let mut cmd = Command::cargo_bin("weft").unwrap();
    cmd.arg("assemble").arg("tests/asm/bad.asm").arg(&dest);
    cmd.assert().failure();
    assert!(!dest.exists());
}
