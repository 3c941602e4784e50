use std::path::Path;
use tempfile::TempDir;

use dupsweep::common::errors::FailureKind;
use dupsweep::duplicates::{
    self, Disposition, ResolutionOutcome, ResolveOptions, RunOptions, ScanOptions,
};
use dupsweep::logging::{self, Reporter};

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

/// a.txt and b.txt share content, c.txt is unique
fn hello_world_fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.txt", "hello");
    write(dir.path(), "b.txt", "hello");
    write(dir.path(), "c.txt", "world");
    dir
}

fn scan(dir: &Path) -> duplicates::FingerprintIndex {
    duplicates::scan(dir, &ScanOptions::default(), &Reporter::silent())
}

#[test]
fn test_quarantine_scenario() {
    let data = hello_world_fixture();
    let work = TempDir::new().unwrap();
    let quarantine = work.path().join("duplicates");

    let report = duplicates::resolve(
        scan(data.path()),
        data.path(),
        &ResolveOptions::quarantine(&quarantine),
        &Reporter::silent(),
    );

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.unique_files, 1);
    assert_eq!(report.moved(), 1);
    assert_eq!(report.failed(), 0);

    assert!(data.path().join("a.txt").exists(), "canonical stays");
    assert!(!data.path().join("b.txt").exists(), "redundant leaves");
    assert!(data.path().join("c.txt").exists(), "unique untouched");
    assert_eq!(std::fs::read_to_string(quarantine.join("b.txt")).unwrap(), "hello");
    assert!(!quarantine.join("a.txt").exists());
    assert!(!quarantine.join("c.txt").exists());

    let group = &report.groups[0];
    assert_eq!(group.keep, data.path().join("a.txt"));
    assert_eq!(
        group.files[0].outcome,
        ResolutionOutcome::Moved {
            to: quarantine.join("b.txt")
        }
    );
    assert_eq!(report.bytes_freed(), 5);
}

#[test]
fn test_delete_mode() {
    let data = hello_world_fixture();

    let report = duplicates::resolve(
        scan(data.path()),
        data.path(),
        &ResolveOptions::delete(),
        &Reporter::silent(),
    );

    assert_eq!(report.deleted(), 1);
    assert!(data.path().join("a.txt").exists());
    assert!(!data.path().join("b.txt").exists());
    assert!(data.path().join("c.txt").exists());
}

#[test]
fn test_unique_group_is_noop() {
    let data = TempDir::new().unwrap();
    write(data.path(), "only.txt", "solo");

    let report = duplicates::resolve(
        scan(data.path()),
        data.path(),
        &ResolveOptions::delete(),
        &Reporter::silent(),
    );

    assert!(report.groups.is_empty());
    assert_eq!(report.unique_files, 1);
    assert_eq!(report.outcomes().count(), 0);
    assert!(data.path().join("only.txt").exists());
}

#[test]
fn test_group_of_n_gets_n_minus_one_actions() {
    let data = TempDir::new().unwrap();
    for name in ["d1", "d2", "d3", "d4"] {
        write(data.path(), name, "quad");
    }
    write(data.path(), "p1", "pair");
    write(data.path(), "p2", "pair");

    let report = duplicates::resolve(
        scan(data.path()),
        data.path(),
        &ResolveOptions::delete(),
        &Reporter::silent(),
    );

    assert_eq!(report.groups.len(), 2);
    assert_eq!(report.deleted(), 3 + 1);
    for group in &report.groups {
        assert!(group.files.iter().all(|f| f.path != group.keep));
        assert!(group.keep.exists());
    }
    assert!(data.path().join("d1").exists());
    assert!(data.path().join("p1").exists());
    assert!(!data.path().join("d4").exists());
}

#[test]
fn test_quarantine_never_overwrites() {
    let data = hello_world_fixture();
    let work = TempDir::new().unwrap();
    let quarantine = work.path().join("duplicates");
    std::fs::create_dir(&quarantine).unwrap();
    write(&quarantine, "b.txt", "from an earlier run");

    let index = scan(data.path());
    let fp = index.duplicate_groups().next().unwrap().fingerprint.clone();

    let report = duplicates::resolve(
        index,
        data.path(),
        &ResolveOptions::quarantine(&quarantine),
        &Reporter::silent(),
    );

    let expected = quarantine.join(format!("b.{}.txt", fp.short()));
    assert_eq!(report.moved(), 1);
    assert_eq!(
        std::fs::read_to_string(quarantine.join("b.txt")).unwrap(),
        "from an earlier run"
    );
    assert_eq!(std::fs::read_to_string(&expected).unwrap(), "hello");
}

#[test]
fn test_file_vanishing_between_scan_and_resolve_is_isolated() {
    let data = TempDir::new().unwrap();
    write(data.path(), "a1", "alpha");
    write(data.path(), "a2", "alpha");
    write(data.path(), "a3", "alpha");
    write(data.path(), "b1", "beta");
    write(data.path(), "b2", "beta");

    let index = scan(data.path());
    std::fs::remove_file(data.path().join("a2")).unwrap();

    let report = duplicates::resolve(
        index,
        data.path(),
        &ResolveOptions::delete(),
        &Reporter::silent(),
    );

    assert_eq!(report.failed(), 1);
    assert_eq!(report.deleted(), 2, "a3 and b2 still handled");
    assert!(!data.path().join("a3").exists());
    assert!(!data.path().join("b2").exists());

    let failure = report
        .outcomes()
        .find(|f| f.outcome.is_failure())
        .unwrap();
    assert_eq!(failure.path, data.path().join("a2"));
    assert!(matches!(
        failure.outcome,
        ResolutionOutcome::Failed {
            kind: FailureKind::NotFound,
            ..
        }
    ));
}

#[cfg(unix)]
#[test]
fn test_permission_revoked_after_scan_is_isolated() {
    use std::os::unix::fs::PermissionsExt;

    let data = TempDir::new().unwrap();
    let locked_dir = data.path().join("locked");
    std::fs::create_dir(&locked_dir).unwrap();
    write(&locked_dir, "x1", "same");
    write(&locked_dir, "x2", "same");

    let open_dir = data.path().join("open");
    std::fs::create_dir(&open_dir).unwrap();
    write(&open_dir, "y1", "same");
    write(&open_dir, "y2", "same");

    let locked_index = scan(&locked_dir);
    let open_index = scan(&open_dir);
    std::fs::set_permissions(&locked_dir, std::fs::Permissions::from_mode(0o555)).unwrap();

    // Privileged users ignore the mode bits; nothing to test then
    let probe = locked_dir.join("probe");
    if std::fs::write(&probe, "").is_ok() {
        std::fs::set_permissions(&locked_dir, std::fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let locked = duplicates::resolve(
        locked_index,
        &locked_dir,
        &ResolveOptions::delete(),
        &Reporter::silent(),
    );
    let open = duplicates::resolve(
        open_index,
        &open_dir,
        &ResolveOptions::delete(),
        &Reporter::silent(),
    );

    std::fs::set_permissions(&locked_dir, std::fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(locked.failed(), 1);
    assert!(matches!(
        locked.groups[0].files[0].outcome,
        ResolutionOutcome::Failed {
            kind: FailureKind::PermissionDenied,
            ..
        }
    ));
    assert!(locked_dir.join("x2").exists());
    assert_eq!(open.deleted(), 1);
}

#[test]
fn test_dry_run_changes_nothing() {
    let data = hello_world_fixture();
    let work = TempDir::new().unwrap();
    let quarantine = work.path().join("duplicates");

    let options = ResolveOptions {
        dry_run: true,
        ..ResolveOptions::quarantine(&quarantine)
    };
    let report = duplicates::resolve(scan(data.path()), data.path(), &options, &Reporter::silent());

    assert_eq!(report.planned(), 1);
    assert_eq!(report.moved(), 0);
    assert_eq!(report.bytes_freed(), 0);
    assert!(data.path().join("b.txt").exists());
    assert!(!quarantine.exists(), "dry run must not create the quarantine dir");
    assert_eq!(
        report.groups[0].files[0].outcome,
        ResolutionOutcome::Planned {
            to: Some(quarantine.join("b.txt"))
        }
    );
}

#[test]
fn test_quarantine_dir_unavailable_fails_every_move() {
    let data = hello_world_fixture();
    let work = TempDir::new().unwrap();
    // A regular file where the directory should go
    let blocker = work.path().join("duplicates");
    write(work.path(), "duplicates", "not a dir");

    let report = duplicates::resolve(
        scan(data.path()),
        data.path(),
        &ResolveOptions::quarantine(&blocker),
        &Reporter::silent(),
    );

    assert_eq!(report.failed(), 1);
    assert_eq!(report.moved(), 0);
    assert!(data.path().join("b.txt").exists());
}

#[test]
fn test_run_rejects_missing_target() {
    let work = TempDir::new().unwrap();
    let missing = work.path().join("nope");
    let quarantine = work.path().join("duplicates");

    let options = RunOptions {
        scan: ScanOptions::default(),
        resolve: ResolveOptions::quarantine(&quarantine),
    };
    let err = duplicates::run(&missing, &options, &Reporter::silent()).unwrap_err();

    assert_eq!(err.kind(), FailureKind::NotFound);
    assert!(!quarantine.exists(), "no filesystem mutation");
}

#[test]
fn test_run_rejects_file_target() {
    let work = TempDir::new().unwrap();
    write(work.path(), "plain.txt", "x");

    let err = duplicates::check_target(&work.path().join("plain.txt")).unwrap_err();
    assert_eq!(err.kind(), FailureKind::Unexpected);
}

#[test]
fn test_run_summary() {
    let data = hello_world_fixture();
    write(data.path(), ".hidden", "hello");

    let options = RunOptions {
        scan: ScanOptions::default(),
        resolve: ResolveOptions::delete(),
    };
    let summary = duplicates::run(data.path(), &options, &Reporter::silent()).unwrap();

    assert_eq!(summary.disposition, Disposition::Delete);
    assert_eq!(summary.scan.entries_seen, 4);
    assert_eq!(summary.scan.skipped_hidden, 1);
    assert_eq!(summary.fingerprints, 2);
    assert_eq!(summary.duplicate_groups(), 1);
    assert_eq!(summary.resolution.deleted(), 1);
    assert!(data.path().join(".hidden").exists());
}

#[test]
fn test_audit_log_records_successes_only_when_enabled() {
    let work = TempDir::new().unwrap();
    let log_file = work.path().join("history.log");

    let quiet = hello_world_fixture();
    let audited = hello_world_fixture();
    {
        let _session = logging::init(&log_file, false).unwrap();
        duplicates::resolve(
            scan(quiet.path()),
            quiet.path(),
            &ResolveOptions::delete(),
            &Reporter::silent(),
        );
        let options = ResolveOptions {
            audit: true,
            ..ResolveOptions::delete()
        };
        duplicates::resolve(scan(audited.path()), audited.path(), &options, &Reporter::silent());
    }

    let log = std::fs::read_to_string(&log_file).unwrap();
    let audited_line = format!("Deleted: {}", audited.path().join("b.txt").display());
    let quiet_line = format!("Deleted: {}", quiet.path().join("b.txt").display());
    assert!(log.contains(&audited_line));
    assert!(!log.contains(&quiet_line));
}

#[test]
fn test_failures_logged_even_without_audit() {
    let work = TempDir::new().unwrap();
    let log_file = work.path().join("history.log");
    let data = hello_world_fixture();

    {
        let _session = logging::init(&log_file, false).unwrap();
        let index = scan(data.path());
        std::fs::remove_file(data.path().join("b.txt")).unwrap();
        duplicates::resolve(index, data.path(), &ResolveOptions::delete(), &Reporter::silent());
    }

    let log = std::fs::read_to_string(&log_file).unwrap();
    assert!(log.contains("ERROR"));
    assert!(log.contains("Not found"));
    assert!(log.contains(&data.path().join("b.txt").display().to_string()));
}
