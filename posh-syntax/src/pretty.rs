// This file is part of posh, a POSIX-style shell.

//! `Display` impls that print an AST back out as shell source
//!
//! Every node round-trips: lexing and parsing the printed form of a tree
//! yields a tree equal to the original (module docs on individual impls call
//! out the one exception, `function` vs. `name()` spelling, which collapses
//! to the same form either way since [`FunctionDef`] doesn't record which
//! one was used).
//!
//! A compound command's condition and body lists are printed with a forced
//! trailing `;` (see the `{:#}` uses below) even when the source didn't need
//! one, because a reserved word like `then`/`do`/`done` is only recognized
//! in command-start position: without a `;` or newline right before it, `do
//! echo a done` parses as the three-word command `echo a done`, not a loop
//! body followed by `done`.

use crate::syntax::*;
use crate::token::Keyword;
use std::fmt;
use std::fmt::Write as _;

impl fmt::Display for TextUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextUnit::Literal(s) => f.write_str(s),
            TextUnit::Backslashed(c) => write!(f, "\\{c}"),
            TextUnit::RawParam { name, .. } => write!(f, "${name}"),
            TextUnit::CommandSubst { content, .. } => write!(f, "$({content})"),
            TextUnit::Backquote { content, .. } => write!(f, "`{content}`"),
            TextUnit::Arith { content, .. } => write!(f, "$(({content}))"),
            TextUnit::BracedParam { name, modifier, .. } => {
                f.write_str("${")?;
                if matches!(modifier, Modifier::Length) {
                    f.write_char('#')?;
                }
                f.write_str(name)?;
                if !matches!(modifier, Modifier::None | Modifier::Length) {
                    write!(f, "{modifier}")?;
                }
                f.write_char('}')
            }
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Modifier::*;
        match self {
            // Printed by the `${...}` wrapper itself, not here.
            None | Length => Ok(()),
            DefaultIfUnsetOrEmpty(w) => write!(f, ":-{w}"),
            AssignIfUnsetOrEmpty(w) => write!(f, ":={w}"),
            ErrorIfUnsetOrEmpty(w) => write!(f, ":?{w}"),
            AlternateIfNotEmpty(w) => write!(f, ":+{w}"),
            RemoveSmallestPrefix(w) => write!(f, "#{w}"),
            RemoveLargestPrefix(w) => write!(f, "##{w}"),
            RemoveSmallestSuffix(w) => write!(f, "%{w}"),
            RemoveLargestSuffix(w) => write!(f, "%%{w}"),
            ReplaceFirst(pat, rep) => write!(f, "/{pat}/{rep}"),
            ReplaceAll(pat, rep) => write!(f, "//{pat}/{rep}"),
            ReplacePrefix(pat, rep) => write!(f, "/#{pat}/{rep}"),
            ReplaceSuffix(pat, rep) => write!(f, "/%{pat}/{rep}"),
            UppercaseFirst => f.write_char('^'),
            UppercaseAll => f.write_str("^^"),
            LowercaseFirst => f.write_char(','),
            LowercaseAll => f.write_str(",,"),
        }
    }
}

impl fmt::Display for WordUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordUnit::Unquoted(t) => write!(f, "{t}"),
            WordUnit::SingleQuoted(s) => write!(f, "'{s}'"),
            WordUnit::DoubleQuoted(units) => {
                f.write_char('"')?;
                for u in units {
                    write!(f, "{u}")?;
                }
                f.write_char('"')
            }
            WordUnit::Tilde(name) => write!(f, "~{name}"),
        }
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for unit in &self.units {
            write!(f, "{unit}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

impl fmt::Display for RedirOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RedirOp::FileIn => "<",
            RedirOp::FileOut => ">",
            RedirOp::Append => ">>",
            RedirOp::DupIn => "<&",
            RedirOp::DupOut => ">&",
            RedirOp::FileOutErr => "&>",
        })
    }
}

impl fmt::Display for Redirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fd != self.op.default_fd() {
            write!(f, "{}", self.fd)?;
        }
        write!(f, "{}{}", self.op, self.target)
    }
}

impl fmt::Display for SimpleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let starts_with_keyword = self.words.first().is_some_and(|w| match &w.units[..] {
            [WordUnit::Unquoted(TextUnit::Literal(s))] => Keyword::parse(s).is_some(),
            _ => false,
        });

        let mut parts = Vec::new();
        parts.extend(self.assignments.iter().map(ToString::to_string));
        if !self.assignments.is_empty() || !starts_with_keyword {
            parts.extend(self.words.iter().map(ToString::to_string));
            parts.extend(self.redirections.iter().map(ToString::to_string));
        } else {
            // A bare keyword-spelled first word with a leading redirection
            // (`2>log if`) would otherwise read as a compound command.
            parts.extend(self.redirections.iter().map(ToString::to_string));
            parts.extend(self.words.iter().map(ToString::to_string));
        }
        f.write_str(&parts.join(" "))
    }
}

impl fmt::Display for CompoundCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompoundCommand::Brace(list) => write!(f, "{{ {list:#} }}"),
            CompoundCommand::Subshell(list) => write!(f, "({list})"),
            CompoundCommand::For(c) => {
                write!(f, "for {}", c.name)?;
                if let Some(words) = &c.words {
                    f.write_str(" in")?;
                    for w in words {
                        write!(f, " {w}")?;
                    }
                    f.write_char(';')?;
                }
                write!(f, " do {:#} done", c.body)
            }
            CompoundCommand::While(c) => {
                let keyword = if c.negate_condition { "until" } else { "while" };
                write!(f, "{keyword} {:#} do {:#} done", c.condition, c.body)
            }
            CompoundCommand::If(c) => {
                write!(f, "if {:#} then {:#} ", c.condition, c.body)?;
                for (condition, body) in &c.elifs {
                    write!(f, "elif {condition:#} then {body:#} ")?;
                }
                if let Some(else_branch) = &c.else_branch {
                    write!(f, "else {else_branch:#} ")?;
                }
                f.write_str("fi")
            }
            CompoundCommand::Case(c) => {
                write!(f, "case {} in", c.subject)?;
                for item in &c.items {
                    f.write_char(' ')?;
                    for (i, pattern) in item.patterns.iter().enumerate() {
                        if i > 0 {
                            f.write_char('|')?;
                        }
                        write!(f, "{pattern}")?;
                    }
                    write!(f, ") {} ;;", item.body)?;
                }
                f.write_str(" esac")
            }
        }
    }
}

impl fmt::Display for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}() {}", self.name, self.body)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Simple(c) => write!(f, "{c}"),
            Command::Compound {
                command,
                redirections,
                ..
            } => {
                write!(f, "{command}")?;
                for r in redirections {
                    write!(f, " {r}")?;
                }
                Ok(())
            }
            Command::Function(def) => write!(f, "{def}"),
        }
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("! ")?;
        }
        for (i, command) in self.commands.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{command}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Connector::And => "&&",
            Connector::Or => "||",
        })
    }
}

impl fmt::Display for AndOrList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first)?;
        for (connector, pipeline) in &self.rest {
            write!(f, " {connector} {pipeline}")?;
        }
        Ok(())
    }
}

/// By default the `;` terminator is omitted; with `{:#}` it is always shown
/// (`&` is always shown either way). See the module docs for why compound
/// command bodies render with the alternate form.
impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.and_or)?;
        match self.terminator {
            Terminator::Background => f.write_str(" &"),
            Terminator::Sequential if f.alternate() => f.write_char(';'),
            Terminator::Sequential => Ok(()),
        }
    }
}

impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some((last, rest)) = self.items.split_last() else {
            return Ok(());
        };
        for item in rest {
            write!(f, "{item:#} ")?;
        }
        if f.alternate() {
            write!(f, "{last:#}")
        } else {
            write!(f, "{last}")
        }
    }
}
