use std::process::Command;

fn exif_banner() -> Command {
    Command::new(env!("CARGO_BIN_EXE_exif-banner"))
}

#[test]
fn no_files_is_a_usage_error() {
    let output = exif_banner().output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: no filenames specified"), "stderr: {stderr}");
    assert!(output.stdout.is_empty());
}

#[test]
fn help_lists_file_argument() {
    let output = exif_banner().arg("--help").output().unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("[FILE]..."));
}
