use minish_core::{CommandOutput, Shell, ShellConfig};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::{tempdir, TempDir};

/// Shell rooted at `<temp>/work` with bookkeeping files beside it.
struct Harness {
    temp: TempDir,
    shell: Shell,
    answers: Rc<RefCell<VecDeque<&'static str>>>,
    questions: Rc<RefCell<Vec<String>>>,
}

impl Harness {
    fn new() -> Self {
        let temp = tempdir().expect("tempdir");
        let work = temp.path().join("work");
        fs::create_dir_all(&work).unwrap();

        let mut config = ShellConfig::new(&work);
        config.history_file = temp.path().join(".history");
        config.trash_dir = temp.path().join(".trash");
        config.log_file = temp.path().join("shell.log");

        let answers: Rc<RefCell<VecDeque<&'static str>>> = Rc::default();
        let questions: Rc<RefCell<Vec<String>>> = Rc::default();
        let (a, q) = (answers.clone(), questions.clone());
        let shell = Shell::open(config, move |question: &str| {
            q.borrow_mut().push(question.to_string());
            let answer = a.borrow_mut().pop_front().unwrap_or("n");
            minish_core::is_affirmative(answer)
        })
        .expect("open shell");

        Self {
            temp,
            shell,
            answers,
            questions,
        }
    }

    fn work(&self) -> PathBuf {
        self.temp.path().join("work")
    }

    fn trash_entries(&self) -> Vec<PathBuf> {
        fs::read_dir(self.temp.path().join(".trash"))
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }

    fn answer(&self, answer: &'static str) {
        self.answers.borrow_mut().push_back(answer);
    }

    fn run(&mut self, line: &str) -> CommandOutput {
        self.shell.execute(line)
    }

    fn log(&self) -> String {
        fs::read_to_string(self.temp.path().join("shell.log")).unwrap_or_default()
    }
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn copy_then_undo_removes_only_the_copy() {
    let mut h = Harness::new();
    write(&h.work().join("f.txt"), "hello");

    assert!(h.run("cp f.txt g.txt").success);
    assert_eq!(fs::read_to_string(h.work().join("g.txt")).unwrap(), "hello");

    let out = h.run("undo");
    assert!(out.success, "{out}");
    assert!(!h.work().join("g.txt").exists());
    assert_eq!(fs::read_to_string(h.work().join("f.txt")).unwrap(), "hello");
    assert!(h.shell.history().is_empty());
    assert!(h.log().contains("] undo: cp f.txt g.txt\n"));
}

#[test]
fn empty_and_non_empty_directory_removal() {
    let mut h = Harness::new();
    fs::create_dir(h.work().join("empty")).unwrap();
    write(&h.work().join("nonempty/file.txt"), "x");

    assert!(h.run("rm empty").success);
    assert!(!h.work().join("empty").exists());

    let out = h.run("rm nonempty");
    assert!(!out.success);
    assert!(out.message.contains("directory not empty"), "{out}");
    assert!(h.work().join("nonempty/file.txt").exists());
    assert!(h.questions.borrow().is_empty());
}

#[test]
fn declined_recursive_delete_changes_nothing() {
    let mut h = Harness::new();
    write(&h.work().join("bigdir/a/b.txt"), "keep");
    h.answer("n");

    let out = h.run("rm bigdir -r");
    assert_eq!(out.message, "Cancelled");
    assert!(h.work().join("bigdir/a/b.txt").exists());
    assert!(h.trash_entries().is_empty());
    assert!(h.shell.history().is_empty());
    assert_eq!(h.questions.borrow().len(), 1);
}

#[test]
fn recursive_delete_then_undo_restores_content() {
    let mut h = Harness::new();
    write(&h.work().join("project/src/main.txt"), "fn main");
    write(&h.work().join("project/README"), "readme");
    h.answer("y");

    assert!(h.run("rm -r project").success);
    assert!(!h.work().join("project").exists());
    assert_eq!(h.trash_entries().len(), 1);
    assert_eq!(h.shell.history().last(), Some("rm -r project"));

    let out = h.run("undo");
    assert_eq!(out.message, "Restored: project");
    assert_eq!(
        fs::read_to_string(h.work().join("project/src/main.txt")).unwrap(),
        "fn main"
    );
    assert_eq!(fs::read_to_string(h.work().join("project/README")).unwrap(), "readme");
    assert!(h.trash_entries().is_empty());
    assert!(h.shell.history().is_empty());
}

#[test]
fn undo_restores_into_current_directory() {
    let mut h = Harness::new();
    write(&h.work().join("data/x"), "1");
    fs::create_dir(h.work().join("elsewhere")).unwrap();
    h.answer("y");

    assert!(h.run("rm -r data").success);
    assert!(h.run("cd elsewhere").success);
    assert!(h.run("undo").success);
    assert!(h.work().join("elsewhere/data/x").exists());
}

#[test]
fn protected_targets_are_refused_even_with_consent() {
    let mut h = Harness::new();
    fs::create_dir(h.work().join("inner")).unwrap();
    assert!(h.run("cd inner").success);

    for line in ["rm -r .", "rm -r ..", "rm -r /", "rm .", "rm -r ../inner"] {
        h.answer("y");
        let out = h.run(line);
        assert!(!out.success, "{line}");
        assert!(out.message.contains("protected"), "{line}: {out}");
    }
    assert!(h.work().join("inner").is_dir());
    assert!(h.questions.borrow().is_empty());
    assert!(h.trash_entries().is_empty());
}

#[test]
fn plain_file_delete_is_not_undoable() {
    let mut h = Harness::new();
    write(&h.work().join("notes.txt"), "n");

    assert!(h.run("rm notes.txt").success);
    assert!(h.trash_entries().is_empty());
    assert_eq!(h.run("undo").message, "Nothing to undo");
}

#[test]
fn recursive_flag_on_a_file_does_not_revive_older_trash() {
    let mut h = Harness::new();
    write(&h.work().join("olddir/keep.txt"), "old");
    write(&h.work().join("notes.txt"), "n");
    h.answer("y");

    assert!(h.run("rm -r olddir").success);
    assert!(h.run("rm -r notes.txt").success);
    assert_eq!(h.shell.history().last(), Some("rm notes.txt"));

    assert_eq!(h.run("undo").message, "Nothing to undo");
    assert!(!h.work().join("olddir").exists());
    assert_eq!(h.trash_entries().len(), 1);
    assert_eq!(
        h.shell.history().entries().to_vec(),
        vec!["rm -r olddir".to_string(), "rm notes.txt".to_string()]
    );
}

#[test]
fn undo_with_empty_history() {
    let mut h = Harness::new();
    let out = h.run("undo");
    assert!(out.success);
    assert_eq!(out.message, "Nothing to undo: history is empty");
}

#[test]
fn history_file_keeps_last_hundred_commands() {
    let mut h = Harness::new();
    write(&h.work().join("src.txt"), "s");
    for i in 0..150 {
        assert!(h.run(&format!("cp src.txt c{i}.txt")).success);
    }

    let saved = fs::read_to_string(h.temp.path().join(".history")).unwrap();
    let expected: Vec<String> = (50..150).map(|i| format!("cp src.txt c{i}.txt")).collect();
    assert_eq!(saved.lines().collect::<Vec<_>>(), expected);
}

#[test]
fn history_survives_restart() {
    let mut h = Harness::new();
    write(&h.work().join("a"), "");
    assert!(h.run("cp a b").success);

    let mut config = ShellConfig::new(h.work());
    config.history_file = h.temp.path().join(".history");
    config.trash_dir = h.temp.path().join(".trash");
    config.log_file = h.temp.path().join("shell.log");
    let mut reopened = Shell::open(config, |_: &str| false).unwrap();

    assert_eq!(reopened.execute("history").message, "1: cp a b");
    assert!(reopened.execute("undo").success);
    assert!(!h.work().join("b").exists());
}

#[test]
fn grep_reports_matches_or_no_matches() {
    let mut h = Harness::new();
    write(&h.work().join("tree/deep/match.txt"), "alpha\nneedle in hay\n");
    write(&h.work().join("tree/other.txt"), "nothing here\n");

    let out = h.run("grep \"needle\" . -r");
    assert_eq!(out.message, "match.txt:2: needle in hay");

    let out = h.run("grep absent . -r");
    assert!(out.success);
    assert_eq!(out.message, "No matches found");
}

#[test]
fn archives_round_trip_into_current_directory() {
    let mut h = Harness::new();
    write(&h.work().join("site/index.html"), "<html>");

    assert!(h.run("zip site bundle").success);
    assert!(h.work().join("bundle.zip").exists());
    assert!(h.run("tar site bundle.tar.gz").success);
    assert!(h.work().join("bundle.tar.gz").exists());

    fs::create_dir(h.work().join("out")).unwrap();
    assert!(h.run("cd out").success);
    assert!(h.run("unzip ../bundle.zip").success);
    assert_eq!(fs::read_to_string(h.work().join("out/index.html")).unwrap(), "<html>");

    fs::remove_file(h.work().join("out/index.html")).unwrap();
    assert!(h.run("untar ../bundle.tar.gz").success);
    assert_eq!(fs::read_to_string(h.work().join("out/index.html")).unwrap(), "<html>");
    assert!(h.shell.history().is_empty());
}

#[test]
fn every_attempt_is_logged() {
    let mut h = Harness::new();
    h.run("ls");
    h.run("cat missing.txt");

    let log = h.log();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with("] ls ."));
    assert!(lines[1].ends_with("] cat missing.txt"));
    assert!(lines[2].contains("] ERROR: no such file or directory"));
}
