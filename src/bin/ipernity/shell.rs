/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use anyhow::{Result, anyhow, bail};
use ipernity::{Permission, PermissionMap};
use std::str::FromStr;

pub const HELP: &str = r#"
    To call an Ipernity method, enter

        <method.name> <param1>=<value1> <param2>=<value2> ...

    where <paramN> is the name of the method parameter and <valueN> the
    corresponding value. If a value contains spaces, enclose it in single
    or double quotes. Note that there must not be spaces around the "=".

    To obtain an application token, enter

        login <resource>=[read|write|delete] ...

    See http://www.ipernity.com/help/api/permissions.html for possible
    values. Omitted scopes get zero permissions (i.e. only public content
    can be read).
"#;

/// One line of shell input
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Empty,
    Help,
    Exit,
    Login(PermissionMap),
    Call {
        method: String,
        params: Vec<(String, String)>,
    },
}

// Splits on whitespace; single or double quotes keep a value together
fn split_words(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('"'), '\\') => {
                if let Some(escaped) = chars.next() {
                    word.push(escaped);
                }
            }
            (Some(_), c) => word.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                in_word = true;
            }
            (None, '\\') => {
                if let Some(escaped) = chars.next() {
                    word.push(escaped);
                    in_word = true;
                }
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            (None, c) => {
                word.push(c);
                in_word = true;
            }
        }
    }
    if quote.is_some() {
        bail!("unterminated quote");
    }
    if in_word {
        words.push(word);
    }
    Ok(words)
}

fn split_param(word: &str) -> Result<(String, String)> {
    word.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| anyhow!("expected <name>=<value>, got {word:?}"))
}

pub fn parse_line(line: &str) -> Result<Command> {
    let words = split_words(line.trim())?;
    let Some((method, args)) = words.split_first() else {
        return Ok(Command::Empty);
    };

    match method.as_str() {
        "help" => Ok(Command::Help),
        "exit" => Ok(Command::Exit),
        "login" => {
            let mut perms = PermissionMap::new();
            for arg in args {
                let (target, level) = split_param(arg)?;
                let level = Permission::from_str(&level)
                    .map_err(|_| anyhow!("unknown permission level {level:?}"))?;
                perms.insert(target, level);
            }
            Ok(Command::Login(perms))
        }
        _ => Ok(Command::Call {
            method: method.clone(),
            params: args.iter().map(|a| split_param(a)).collect::<Result<_>>()?,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_method_call_with_quoted_values() {
        let cmd = parse_line(r#"doc.set doc_id=12 title="Summer trip" description='a b'"#).unwrap();
        assert_eq!(
            cmd,
            Command::Call {
                method: "doc.set".into(),
                params: vec![
                    ("doc_id".into(), "12".into()),
                    ("title".into(), "Summer trip".into()),
                    ("description".into(), "a b".into()),
                ],
            }
        );
    }

    #[test]
    fn keeps_equals_in_values() {
        let cmd = parse_line("test.echo echo=a=b").unwrap();
        assert_eq!(
            cmd,
            Command::Call {
                method: "test.echo".into(),
                params: vec![("echo".into(), "a=b".into())],
            }
        );
    }

    #[test]
    fn special_commands() {
        assert_eq!(parse_line("   ").unwrap(), Command::Empty);
        assert_eq!(parse_line("help").unwrap(), Command::Help);
        assert_eq!(parse_line("exit").unwrap(), Command::Exit);

        let Command::Login(perms) = parse_line("login doc=write blog=read").unwrap() else {
            panic!("expected login");
        };
        assert_eq!(perms.get("doc"), Some(&Permission::Write));
        assert_eq!(perms.get("blog"), Some(&Permission::Read));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_line("test.echo novalue").is_err());
        assert!(parse_line("login doc=everything").is_err());
        assert!(parse_line("test.echo echo=\"open").is_err());
    }
}
