extern crate assert_cmd;
extern crate image;
extern crate predicates;
extern crate tempfile;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn chaosgame() -> Command {
    let mut cmd = Command::cargo_bin("chaosgame").unwrap();
    cmd.args(&["--threads", "1", "--iterations", "20000"]);
    cmd
}

fn read_rgb(path: &Path) -> ((u32, u32), Vec<u8>) {
    let image = image::open(path).unwrap().to_rgb();
    (image.dimensions(), image.into_raw())
}

#[test]
fn renders_a_preset() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("sierpinski.png");
    chaosgame()
        .args(&["--preset", "sierpinski", "--size", "32x24"])
        .args(&["--output", out.to_str().unwrap()])
        .assert()
        .success();

    let (dimensions, rgb) = read_rgb(&out);
    assert_eq!(dimensions, (32, 24));
    assert!(rgb.iter().any(|&c| c > 0));
    // Grayscale in, grayscale out.
    assert!(rgb.chunks(3).all(|p| p[0] == p[1] && p[1] == p[2]));
}

#[test]
fn renders_a_scene_with_its_own_color_map() {
    let dir = tempdir().unwrap();
    let maps = dir.path().join("maps.txt");
    let mut text = String::from("reds\n");
    for i in 0..256 {
        text.push_str(&format!("{} 0 0\n", i));
    }
    fs::write(&maps, text).unwrap();

    let scene = dir.path().join("scene.txt");
    fs::write(
        &scene,
        "colormap reds\n\
         average 0 0.2 0.2 0.3\n\
         average 0 0.5 0.8 0.6\n\
         average 0 1.0 0.4 0.9\n",
    )
    .unwrap();

    let out = dir.path().join("reds.png");
    chaosgame()
        .args(&["--config", scene.to_str().unwrap()])
        .args(&["--colormaps", maps.to_str().unwrap()])
        .args(&["--size", "16x16", "--output", out.to_str().unwrap()])
        .assert()
        .success();

    let (dimensions, rgb) = read_rgb(&out);
    assert_eq!(dimensions, (16, 16));
    assert!(rgb.chunks(3).any(|p| p[0] > 0));
    assert!(rgb.chunks(3).all(|p| p[1] == 0 && p[2] == 0));
}

#[test]
fn bad_scene_is_reported() {
    let dir = tempdir().unwrap();
    let scene = dir.path().join("bad.txt");
    fs::write(&scene, "average 1 0 zero 0\n").unwrap();
    let out = dir.path().join("never.png");

    chaosgame()
        .args(&["--config", scene.to_str().unwrap()])
        .args(&["--output", out.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot parse 'zero'"));
    assert!(!out.exists());
}

#[test]
fn missing_scene_is_reported() {
    chaosgame()
        .args(&["--config", "/no/such/scene.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read /no/such/scene.txt"));
}

#[test]
fn unknown_color_map_is_reported() {
    let dir = tempdir().unwrap();
    let scene = dir.path().join("scene.txt");
    fs::write(&scene, "colormap Ocean\naverage 1 0 0 0\n").unwrap();
    chaosgame()
        .args(&["--config", scene.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no color map named 'Ocean'"));
}

#[test]
fn config_and_preset_conflict() {
    chaosgame()
        .args(&["--config", "scene.txt", "--preset", "fern"])
        .assert()
        .failure();
}

#[test]
fn empty_image_is_rejected() {
    let dir = tempdir().unwrap();
    chaosgame()
        .args(&["--preset", "fern", "--size", "0x10"])
        .args(&["--output", dir.path().join("x.png").to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid render settings"));
}

#[test]
fn preview_frames_leave_a_final_image() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("preview.png");
    Command::cargo_bin("chaosgame")
        .unwrap()
        .args(&["--threads", "1", "--preset", "leaf", "--size", "24x24"])
        .args(&["--frames", "2", "--cadence", "20"])
        .env("RUST_LOG", "info")
        .args(&["--output", out.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("wrote preview 2 of 2"));

    let (dimensions, _) = read_rgb(&out);
    assert_eq!(dimensions, (24, 24));
}

#[test]
fn escaping_scene_is_reported() {
    let dir = tempdir().unwrap();
    let scene = dir.path().join("escape.txt");
    fs::write(&scene, "affine 1 0 1.07 0 0 1.07 1 1\n").unwrap();
    let out = dir.path().join("never.png");
    chaosgame()
        .args(&["--config", scene.to_str().unwrap()])
        .args(&["--output", out.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("escaped to infinity"));
    assert!(!out.exists());
}
