#![deny(unused_must_use)]

use std::{env, path::PathBuf};

use xshell::cmd;

/// Feature sets that must build without the standard library.
const NO_STD_FEATURES: &[&str] = &["", "defmt", "log,rust-mqtt"];

fn main() -> Result<(), anyhow::Error> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    let args = args.iter().map(|s| &**s).collect::<Vec<_>>();

    match &args[..] {
        ["ci"] => test_ci(),
        ["update"] => update(),
        _ => {
            println!("USAGE cargo xtask [ci|update]");
            Ok(())
        }
    }
}

fn update() -> Result<(), anyhow::Error> {
    let _p = xshell::pushd(root_dir())?;
    cmd!("cargo update").run()?;
    Ok(())
}

fn test_ci() -> Result<(), anyhow::Error> {
    let _e = xshell::pushenv("CI", "true");
    test_device()?;
    check_no_std()?;
    Ok(())
}

fn test_device() -> Result<(), anyhow::Error> {
    let _p = xshell::pushd(device_dir())?;
    cmd!("cargo test --features rust-mqtt").run()?;
    Ok(())
}

fn check_no_std() -> Result<(), anyhow::Error> {
    let _p = xshell::pushd(device_dir())?;
    for features in NO_STD_FEATURES {
        println!("Checking device with features [{}]", features);
        cmd!("cargo check --no-default-features --features {features}").run()?;
    }
    Ok(())
}

fn device_dir() -> PathBuf {
    let mut device = root_dir();
    device.push("device");
    device
}

fn root_dir() -> PathBuf {
    let mut xtask_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    xtask_dir.pop();
    xtask_dir
}
