#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// The date every harness command runs on.
pub const TODAY: &str = "2026-02-05";

/// Test harness for running CLI commands against a temporary vault
pub struct CliTestHarness {
    temp_dir: TempDir,
}

impl CliTestHarness {
    /// Create a new test harness with an empty vault
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        Self { temp_dir }
    }

    /// Get a Command instance configured for testing
    pub fn command(&self) -> Command {
        self.command_at(TODAY)
    }

    /// A command that runs as if today were `today`
    pub fn command_at(&self, today: &str) -> Command {
        let mut cmd = Command::cargo_bin("cadence").expect("Failed to find cadence binary");

        // The vault comes from the environment, and no config file is picked up
        cmd.current_dir(self.temp_dir.path());
        cmd.env("CADENCE_VAULT", self.temp_dir.path());
        cmd.env_remove("RUST_LOG");
        cmd.args(["--today", today]);

        cmd
    }

    pub fn vault(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes a task file into the vault
    pub fn write_task(&self, name: &str, content: &str) {
        fs::write(self.vault().join(format!("{}.md", name)), content).expect("Failed to write task file");
    }

    /// Reads a task file back
    pub fn read_task(&self, name: &str) -> String {
        fs::read_to_string(self.vault().join(format!("{}.md", name))).expect("Failed to read task file")
    }

    /// Helper to run a command and assert success
    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    /// Helper to run a command on another day and assert success
    pub fn run_success_at(&self, today: &str, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command_at(today).args(args).assert().success()
    }

    /// Helper to run a command and assert failure
    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }
}

/// Common test fixtures
pub struct TestFixtures;

impl TestFixtures {
    /// Every third day from 2026-02-01
    pub fn water_plants() -> &'static str {
        "---
title: Water plants
scheduled: 2026-02-01
recurrence: DTSTART:20260201;FREQ=DAILY;INTERVAL=3
recurrence_anchor: scheduled
active_instances:
- 2026-02-01
---
Use the blue can.
"
    }

    /// Mondays, Wednesdays and Fridays from 2026-02-02
    pub fn gym() -> &'static str {
        "---
title: Gym
scheduled: 2026-02-02
recurrence: DTSTART:20260202;FREQ=WEEKLY;BYDAY=MO,WE,FR
active_instances:
- 2026-02-02
- 2026-02-04
---
"
    }

    pub fn dentist() -> &'static str {
        "---
title: Dentist
scheduled: 2026-02-10
tags:
- health
---
Bring the insurance card.
"
    }

    pub fn backlog() -> &'static str {
        "---
title: Someday read a book
---
"
    }
}

/// Utility functions for test assertions
pub mod assertions {
    use predicates::prelude::*;

    /// Predicate to check if output contains task table headers
    pub fn has_task_table_headers() -> impl Predicate<str> {
        predicate::str::contains("ID")
            .and(predicate::str::contains("Name"))
            .and(predicate::str::contains("Date"))
    }

    /// Predicate to check if output indicates successful completion
    pub fn task_completed_successfully() -> impl Predicate<str> {
        predicate::str::contains("Completed")
    }

    /// Predicate to check for error messages
    pub fn has_error() -> impl Predicate<str> {
        predicate::str::contains("Error").or(predicate::str::contains("error"))
    }
}
