//! Splits a command line into a typed [`Command`].

use crate::errors::ShellError;
use crate::models::CommandKind;
use std::fmt;

/// Entries shown by `history` without an explicit count.
pub const DEFAULT_HISTORY_COUNT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List { path: String, long: bool },
    ChangeDir { path: String },
    Cat { file: String },
    Copy { src: String, dst: String, recursive: bool },
    Move { src: String, dst: String },
    Remove { target: String, recursive: bool },
    Grep { pattern: String, path: String, recursive: bool, ignore_case: bool },
    Zip { source: String, archive: String },
    Unzip { archive: String },
    Tar { source: String, archive: String },
    Untar { archive: String },
    History { count: usize },
    Undo,
    Help,
    Exit,
}

impl Command {
    pub fn parse(line: &str) -> crate::Result<Self> {
        let tokens = tokenize(line)?;
        let Some((verb, rest)) = tokens.split_first() else {
            return Err(ShellError::invalid_input("empty command"));
        };
        let kind = CommandKind::from_verb(verb)
            .ok_or_else(|| ShellError::invalid_input(format!("unknown command: {verb}")))?;
        let args = Args::split(rest);

        let command = match kind {
            CommandKind::List => Self::List {
                path: args.optional(0).unwrap_or(".").to_string(),
                long: args.has('l'),
            },
            CommandKind::ChangeDir => Self::ChangeDir {
                path: args.optional(0).unwrap_or("~").to_string(),
            },
            CommandKind::Cat => Self::Cat {
                file: args.at_least(1, kind)?[0].clone(),
            },
            CommandKind::Copy => {
                let [src, dst] = args.exactly::<2>(kind)?;
                Self::Copy { src, dst, recursive: args.has('r') }
            }
            CommandKind::Move => {
                let [src, dst] = args.exactly::<2>(kind)?;
                Self::Move { src, dst }
            }
            CommandKind::Remove => {
                let [target] = args.exactly::<1>(kind)?;
                Self::Remove { target, recursive: args.has('r') }
            }
            CommandKind::Grep => {
                let operands = args.at_least(2, kind)?;
                Self::Grep {
                    pattern: operands[0].clone(),
                    path: operands[1].clone(),
                    recursive: args.has('r'),
                    ignore_case: args.has('i'),
                }
            }
            CommandKind::Zip => {
                let [source, archive] = args.exactly::<2>(kind)?;
                Self::Zip { source, archive }
            }
            CommandKind::Unzip => Self::Unzip {
                archive: args.at_least(1, kind)?[0].clone(),
            },
            CommandKind::Tar => {
                let [source, archive] = args.exactly::<2>(kind)?;
                Self::Tar { source, archive }
            }
            CommandKind::Untar => Self::Untar {
                archive: args.at_least(1, kind)?[0].clone(),
            },
            CommandKind::History => Self::History {
                count: args
                    .optional(0)
                    .and_then(|value| value.parse().ok())
                    .unwrap_or(DEFAULT_HISTORY_COUNT),
            },
            CommandKind::Undo => Self::Undo,
            CommandKind::Help => Self::Help,
            CommandKind::Exit => Self::Exit,
        };
        Ok(command)
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Self::List { .. } => CommandKind::List,
            Self::ChangeDir { .. } => CommandKind::ChangeDir,
            Self::Cat { .. } => CommandKind::Cat,
            Self::Copy { .. } => CommandKind::Copy,
            Self::Move { .. } => CommandKind::Move,
            Self::Remove { .. } => CommandKind::Remove,
            Self::Grep { .. } => CommandKind::Grep,
            Self::Zip { .. } => CommandKind::Zip,
            Self::Unzip { .. } => CommandKind::Unzip,
            Self::Tar { .. } => CommandKind::Tar,
            Self::Untar { .. } => CommandKind::Untar,
            Self::History { .. } => CommandKind::History,
            Self::Undo => CommandKind::Undo,
            Self::Help => CommandKind::Help,
            Self::Exit => CommandKind::Exit,
        }
    }

    pub fn usage(kind: CommandKind) -> &'static str {
        match kind {
            CommandKind::List => "ls [-l] [path]",
            CommandKind::ChangeDir => "cd [path]",
            CommandKind::Cat => "cat <file>",
            CommandKind::Copy => "cp [-r] <src> <dst>",
            CommandKind::Move => "mv <src> <dst>",
            CommandKind::Remove => "rm [-r] <path>",
            CommandKind::Grep => "grep [-r] [-i] <pattern> <path>",
            CommandKind::Zip => "zip <dir> <archive.zip>",
            CommandKind::Unzip => "unzip <archive.zip>",
            CommandKind::Tar => "tar <dir> <archive.tar.gz>",
            CommandKind::Untar => "untar <archive.tar.gz>",
            CommandKind::History => "history [n]",
            CommandKind::Undo => "undo",
            CommandKind::Help => "help",
            CommandKind::Exit => "exit",
        }
    }
}

/// Canonical text of a command, used for the operation log and history.
/// Flags always precede operands, so `rm dir -r` is recorded as `rm -r dir`.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |on: bool, text: &'static str| if on { text } else { "" };
        match self {
            Self::List { path, long } => write!(f, "ls {}{path}", flag(*long, "-l ")),
            Self::ChangeDir { path } => write!(f, "cd {path}"),
            Self::Cat { file } => write!(f, "cat {file}"),
            Self::Copy { src, dst, recursive } => {
                write!(f, "cp {}{src} {dst}", flag(*recursive, "-r "))
            }
            Self::Move { src, dst } => write!(f, "mv {src} {dst}"),
            Self::Remove { target, recursive } => {
                write!(f, "rm {}{target}", flag(*recursive, "-r "))
            }
            Self::Grep { pattern, path, recursive, ignore_case } => write!(
                f,
                "grep {}{}{pattern} {path}",
                flag(*recursive, "-r "),
                flag(*ignore_case, "-i ")
            ),
            Self::Zip { source, archive } => write!(f, "zip {source} {archive}"),
            Self::Unzip { archive } => write!(f, "unzip {archive}"),
            Self::Tar { source, archive } => write!(f, "tar {source} {archive}"),
            Self::Untar { archive } => write!(f, "untar {archive}"),
            Self::History { count } => write!(f, "history {count}"),
            Self::Undo => write!(f, "undo"),
            Self::Help => write!(f, "help"),
            Self::Exit => write!(f, "exit"),
        }
    }
}

/// Arguments with single-letter flags (`-r`, `-il`) pulled out.
struct Args {
    flags: Vec<char>,
    operands: Vec<String>,
}

impl Args {
    fn split(tokens: &[String]) -> Self {
        let mut flags = Vec::new();
        let mut operands = Vec::new();
        for token in tokens {
            match token.strip_prefix('-') {
                Some(letters) if is_flag_cluster(letters) => flags.extend(letters.chars()),
                _ => operands.push(token.clone()),
            }
        }
        Self { flags, operands }
    }

    fn has(&self, flag: char) -> bool {
        self.flags.contains(&flag)
    }

    fn optional(&self, idx: usize) -> Option<&str> {
        self.operands.get(idx).map(String::as_str)
    }

    fn at_least(&self, n: usize, kind: CommandKind) -> crate::Result<&[String]> {
        if self.operands.len() < n {
            return Err(usage_error(kind));
        }
        Ok(&self.operands)
    }

    fn exactly<const N: usize>(&self, kind: CommandKind) -> crate::Result<[String; N]> {
        <[String; N]>::try_from(self.operands.clone()).map_err(|_| usage_error(kind))
    }
}

fn is_flag_cluster(letters: &str) -> bool {
    !letters.is_empty() && letters.chars().all(|c| matches!(c, 'r' | 'i' | 'l'))
}

fn usage_error(kind: CommandKind) -> ShellError {
    ShellError::invalid_input(format!("usage: {}", Command::usage(kind)))
}

/// Whitespace split that keeps `"..."` and `'...'` groups together.
pub fn tokenize(line: &str) -> crate::Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => current.push(ch),
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                in_token = true;
            }
            None if ch.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(ch);
                in_token = true;
            }
        }
    }
    if quote.is_some() {
        return Err(ShellError::invalid_input("unterminated quote"));
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_may_follow_operands() {
        assert_eq!(
            Command::parse("rm bigdir -r").unwrap(),
            Command::Remove { target: "bigdir".into(), recursive: true }
        );
        assert_eq!(
            Command::parse("grep needle . -r -i").unwrap(),
            Command::Grep {
                pattern: "needle".into(),
                path: ".".into(),
                recursive: true,
                ignore_case: true,
            }
        );
    }

    #[test]
    fn canonical_text_puts_flags_first() {
        let cmd = Command::parse("rm bigdir -r").unwrap();
        assert_eq!(cmd.to_string(), "rm -r bigdir");
        let cmd = Command::parse("cp src dst -r").unwrap();
        assert_eq!(cmd.to_string(), "cp -r src dst");
        let cmd = Command::parse("rm notes.txt").unwrap();
        assert_eq!(cmd.to_string(), "rm notes.txt");
    }

    #[test]
    fn defaults_for_optional_operands() {
        assert_eq!(
            Command::parse("ls").unwrap(),
            Command::List { path: ".".into(), long: false }
        );
        assert_eq!(Command::parse("cd").unwrap(), Command::ChangeDir { path: "~".into() });
        assert_eq!(Command::parse("history abc").unwrap(), Command::History { count: 10 });
        assert_eq!(Command::parse("history 3").unwrap(), Command::History { count: 3 });
    }

    #[test]
    fn wrong_arity_is_a_usage_error() {
        let err = Command::parse("mv only-one").unwrap_err();
        assert_eq!(err.to_string(), "invalid command input: usage: mv <src> <dst>");
        assert!(Command::parse("cp").is_err());
        assert!(Command::parse("rm a b").is_err());
    }

    #[test]
    fn unknown_and_empty_lines_fail() {
        assert!(Command::parse("frobnicate x").is_err());
        assert!(Command::parse("   ").is_err());
    }

    #[test]
    fn quotes_group_and_are_stripped() {
        assert_eq!(
            tokenize(r#"grep "two words" 'a b' plain"#).unwrap(),
            vec!["grep", "two words", "a b", "plain"]
        );
        assert!(tokenize("cat \"open").is_err());
        assert_eq!(tokenize("cat \"\"").unwrap(), vec!["cat", ""]);
    }
}
