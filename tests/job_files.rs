//! Integration tests for the job file front-end and writer.

use std::io::Write;

use rbcp_job::{parse_command, parse_job_file, read_job_file, serialize, write_job_file, CopyJob, JobFile};

const SAVED_JOB: &str = "\
:: JOB_NAME : Documents
:: STOP_IF_DISPOSING : true
::
:: Source Directory :
::
\t/SD:C:\\Users\\me\\Documents\\\t:: Source Directory.
::
:: Destination Directory :
::
\t/DD:\\\\nas\\backup\\Documents\\\t:: Destination Directory.
::
:: Include These Files :
::
\t/IF\t\t:: Include Files matching these names
\t\t*.docx
\t\t*.xlsx
::
:: Exclude These Directories :
::
\t/XD\t\t:: eXclude Directories matching these names
\t\tMy Music
\t\t\"My Videos\"
:: Exclude These Files :
\t/XF\t\t:: eXclude Files matching these names
\t\t~*.tmp
::
:: Copy options :
::
\t/E\t\t:: copy subdirectories, including Empty ones.
\t/COPY:DAT\t:: what to COPY for files (default is /COPY:DAT).
\t/MT:16\t\t:: Do multi-threaded copies with n threads (default 8).
::
:: Retry Options :
::
\t/R:3\t\t:: number of Retries on failed copies: default 1 million.
\t/W:10\t\t:: Wait time between retries: default is 30 seconds.
::
:: Logging Options :
::
\t/NP\t\t:: No Progress - don't display percentage copied.
\t/BYTES\t\t:: Print sizes as bytes.
";

#[test]
fn saved_job_is_understood() {
    let file = parse_job_file(SAVED_JOB.lines());
    assert_eq!(file.name, "Documents");
    assert!(file.stop_if_disposing);

    let job = &file.job;
    assert_eq!(job.copy.source, r"C:\Users\me\Documents\");
    assert_eq!(job.copy.destination, r"\\nas\backup\Documents\");
    assert_eq!(job.copy.file_filter, vec!["*.docx", "*.xlsx"]);
    assert_eq!(job.selection.excluded_directories, vec!["My Music", "My Videos"]);
    assert_eq!(job.selection.excluded_files, vec!["~*.tmp"]);
    assert!(job.copy.copy_subdirectories_including_empty);
    assert_eq!(job.copy.copy_flags, "DAT");
    assert_eq!(job.copy.threads(), 16);
    assert_eq!(job.retry.retry_count, 3);
    assert_eq!(job.retry.retry_wait_time, 10);
    assert!(job.logging.no_progress);
}

#[test]
fn job_file_and_command_line_agree() {
    let file = parse_job_file(SAVED_JOB.lines());
    let reparsed = parse_command(&serialize(&file.job)).unwrap();
    assert_eq!(reparsed, file.job);
}

#[test]
fn sections_without_separator_stay_isolated() {
    let file = parse_job_file(["/XD", "C:\\temp", "/XF", "C:\\temp\\a.txt", "/XD", "late"]);
    assert_eq!(file.job.selection.excluded_directories, vec!["C:\\temp"]);
    assert_eq!(file.job.selection.excluded_files, vec!["C:\\temp\\a.txt"]);
}

#[test]
fn inline_list_values_leave_no_section_open() {
    let file = parse_job_file(["/XD bin", "stray", "/IF *.rs", "*.toml"]);
    assert_eq!(file.job.selection.excluded_directories, vec!["bin"]);
    assert_eq!(file.job.copy.file_filter, vec!["*.rs"]);
}

#[test]
fn unix_paths_and_double_colons_survive_the_writer() {
    let mut job = CopyJob::new("/srv/data", "/mnt/backup");
    job.selection.excluded_directories = vec!["/var/cache".into()];
    job.selection.excluded_files = vec!["\"quoted\".txt".into()];
    job.logging.log_path = r"C:\logs\run ::1.log".into();
    let file = JobFile::new("unix", job);

    assert_eq!(parse_job_file(write_job_file(&file).lines()), file);
}

#[test]
fn both_move_forms_are_kept() {
    let file = parse_job_file(["/MOV", "/MOVE"]);
    assert!(file.job.copy.move_files);
    assert!(file.job.copy.move_files_and_directories);
}

#[test]
fn malformed_run_hours_are_ignored() {
    let file = parse_job_file(["/RH:7-9", "/S"]);
    assert_eq!(file.job.copy.run_hours(), "");
    assert!(file.job.copy.copy_subdirectories);
}

#[test]
fn write_then_read_is_lossless() {
    let mut job = parse_command(
        r#"robocopy "C:\Program Files\App\." D:\mirror *.dll "*.exe" /MIR /XD logs "old builds" /XF *.pdb /RH:2200-0500 /LOG+:D:\copy.log /R:1 /W:1 /REG"#,
    )
    .unwrap();
    job.copy.set_threads(32).unwrap();
    let file = JobFile::new("App mirror", job);

    let text = write_job_file(&file);
    assert_eq!(parse_job_file(text.lines()), file);
}

#[test]
fn read_from_disk() {
    let dir = std::env::temp_dir().join(format!("rbcp-job-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("docs.rcj");
    let mut out = std::fs::File::create(&path).unwrap();
    out.write_all(SAVED_JOB.as_bytes()).unwrap();
    drop(out);

    let file = read_job_file(&path).unwrap();
    assert_eq!(file.name, "Documents");
    std::fs::remove_dir_all(&dir).unwrap();

    assert!(read_job_file(dir.join("missing.rcj")).is_err());
}

#[test]
fn empty_job_file_is_default() {
    let file = parse_job_file(Vec::<String>::new());
    assert_eq!(file, JobFile::default());
    assert_eq!(file.job, CopyJob::default());
}
