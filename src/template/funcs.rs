//! The fixed registry of functions a template may call.
//!
//! Nothing here touches the filesystem, the network or the process
//! environment. `unix_time`, `unix_time_millis` and `random` are the only
//! functions whose output is not determined by their arguments.

use std::fmt;

use rand::distr::Alphanumeric;
use rand::Rng;

use super::error::{TemplateError, TemplateErrorKind};
use crate::context::TemplateContext;

/// Upper bound for `random n`.
pub const MAX_RANDOM_LENGTH: i64 = 1024;

/// Largest string, in bytes, any function call may produce.
pub const MAX_VALUE_LENGTH: usize = 1024;

/// A value produced while rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Text.
    Str(String),
    /// Integer literal or numeric result.
    Int(i64),
    /// Result of a comparison or a `true`/`false` literal.
    Bool(bool),
}

impl Value {
    /// Template truthiness: empty strings, `0` and `false` are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Str(s) => !s.is_empty(),
            Value::Int(i) => *i != 0,
            Value::Bool(b) => *b,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{i}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// A function callable from templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    /// `eq a b...`: true if `a` equals any of the following arguments.
    Eq,
    /// `ne a b`
    Ne,
    /// `printf format args...` supporting `%s %d %v %q %%`.
    Printf,
    /// `truncate n s`: at most `n` bytes of `s`, cut on a char boundary.
    Truncate,
    /// `lowercase s`
    Lowercase,
    /// `uppercase s`
    Uppercase,
    /// `replace old new s`
    Replace,
    /// `unix_time`: current time in decimal seconds.
    UnixTime,
    /// `unix_time_millis`: current time in decimal milliseconds.
    UnixTimeMillis,
    /// `random n`: `n` characters drawn uniformly from `[A-Za-z0-9]`.
    Random,
}

impl Function {
    /// The complete registry.
    pub const ALL: [Function; 10] = [
        Function::Eq,
        Function::Ne,
        Function::Printf,
        Function::Truncate,
        Function::Lowercase,
        Function::Uppercase,
        Function::Replace,
        Function::UnixTime,
        Function::UnixTimeMillis,
        Function::Random,
    ];

    /// Name used to call the function from a template.
    pub const fn name(self) -> &'static str {
        match self {
            Function::Eq => "eq",
            Function::Ne => "ne",
            Function::Printf => "printf",
            Function::Truncate => "truncate",
            Function::Lowercase => "lowercase",
            Function::Uppercase => "uppercase",
            Function::Replace => "replace",
            Function::UnixTime => "unix_time",
            Function::UnixTimeMillis => "unix_time_millis",
            Function::Random => "random",
        }
    }

    /// Resolves a function by name.
    pub fn lookup(name: &str) -> Option<Function> {
        Function::ALL.into_iter().find(|f| f.name() == name)
    }

    pub(crate) fn call(
        self,
        ctx: &TemplateContext,
        args: Vec<Value>,
    ) -> Result<Value, TemplateError> {
        let value = self.apply(ctx, args)?;
        match &value {
            Value::Str(s) if s.len() > MAX_VALUE_LENGTH => Err(too_long(self.name(), s.len())),
            _ => Ok(value),
        }
    }

    fn apply(self, ctx: &TemplateContext, args: Vec<Value>) -> Result<Value, TemplateError> {
        let name = self.name();
        match self {
            Function::Eq => {
                let (first, rest) = args
                    .split_first()
                    .filter(|(_, rest)| !rest.is_empty())
                    .ok_or_else(|| {
                        TemplateError::bad_argument(name, "needs at least 2 arguments")
                    })?;
                for other in rest {
                    if compare(name, first, other)? {
                        return Ok(Value::Bool(true));
                    }
                }
                Ok(Value::Bool(false))
            }
            Function::Ne => {
                let [a, b] = exactly::<2>(name, args)?;
                Ok(Value::Bool(!compare(name, &a, &b)?))
            }
            Function::Printf => {
                let mut args = args.into_iter();
                let format = match args.next() {
                    Some(Value::Str(format)) => format,
                    Some(other) => {
                        return Err(TemplateError::bad_argument(
                            name,
                            format!("format must be a string, got {}", other.type_name()),
                        ));
                    }
                    None => return Err(TemplateError::bad_argument(name, "missing format")),
                };
                sprintf(&format, args.collect()).map(Value::Str)
            }
            Function::Truncate => {
                let [n, s] = exactly::<2>(name, args)?;
                let n = positive_int(name, &n)?;
                let s = string(name, s)?;
                Ok(Value::Str(truncate(&s, n).to_string()))
            }
            Function::Lowercase => {
                let [s] = exactly::<1>(name, args)?;
                Ok(Value::Str(string(name, s)?.to_lowercase()))
            }
            Function::Uppercase => {
                let [s] = exactly::<1>(name, args)?;
                Ok(Value::Str(string(name, s)?.to_uppercase()))
            }
            Function::Replace => {
                let [old, new, s] = exactly::<3>(name, args)?;
                let (old, new, s) = (string(name, old)?, string(name, new)?, string(name, s)?);
                let hits = if old.is_empty() {
                    s.chars().count() + 1
                } else {
                    s.matches(old.as_str()).count()
                };
                let projected = s.len() - hits * old.len() + hits * new.len();
                if projected > MAX_VALUE_LENGTH {
                    return Err(too_long(name, projected));
                }
                Ok(Value::Str(s.replace(&old, &new)))
            }
            Function::UnixTime => {
                exactly::<0>(name, args)?;
                Ok(Value::Str(ctx.now().timestamp().to_string()))
            }
            Function::UnixTimeMillis => {
                exactly::<0>(name, args)?;
                Ok(Value::Str(ctx.now().timestamp_millis().to_string()))
            }
            Function::Random => {
                let [n] = exactly::<1>(name, args)?;
                let n = positive_int(name, &n)?;
                if (n as i64) > MAX_RANDOM_LENGTH {
                    return Err(TemplateError::bad_argument(
                        name,
                        format!("length must not exceed {MAX_RANDOM_LENGTH}"),
                    ));
                }
                Ok(Value::Str(random_alphanumeric(n)))
            }
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Names of every function available to templates.
pub fn registered_functions() -> impl Iterator<Item = &'static str> {
    Function::ALL.into_iter().map(Function::name)
}

fn too_long(name: &str, len: usize) -> TemplateError {
    TemplateError::new(
        TemplateErrorKind::Execution,
        format!("{name}: result of {len} bytes exceeds {MAX_VALUE_LENGTH}"),
    )
}

fn exactly<const N: usize>(name: &str, args: Vec<Value>) -> Result<[Value; N], TemplateError> {
    let got = args.len();
    args.try_into().map_err(|_| {
        TemplateError::bad_argument(name, format!("wants {N} arguments, got {got}"))
    })
}

fn string(name: &str, value: Value) -> Result<String, TemplateError> {
    match value {
        Value::Str(s) => Ok(s),
        other => Err(TemplateError::bad_argument(
            name,
            format!("expected string, got {}", other.type_name()),
        )),
    }
}

fn positive_int(name: &str, value: &Value) -> Result<usize, TemplateError> {
    match value {
        Value::Int(n) if *n > 0 => usize::try_from(*n)
            .map_err(|_| TemplateError::bad_argument(name, "length out of range")),
        Value::Int(_) => Err(TemplateError::bad_argument(name, "length must be positive")),
        other => Err(TemplateError::bad_argument(
            name,
            format!("expected int, got {}", other.type_name()),
        )),
    }
}

fn compare(name: &str, a: &Value, b: &Value) -> Result<bool, TemplateError> {
    match (a, b) {
        (Value::Str(a), Value::Str(b)) => Ok(a == b),
        (Value::Int(a), Value::Int(b)) => Ok(a == b),
        (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
        _ => Err(TemplateError::bad_argument(
            name,
            format!(
                "incompatible types for comparison: {} and {}",
                a.type_name(),
                b.type_name()
            ),
        )),
    }
}

/// Cuts `s` to at most `max` bytes without splitting a character.
pub(crate) fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn random_alphanumeric(len: usize) -> String {
    let mut rng = rand::rng();
    std::iter::repeat_with(|| rng.sample(Alphanumeric) as char)
        .take(len)
        .collect()
}

fn sprintf(format: &str, args: Vec<Value>) -> Result<String, TemplateError> {
    const NAME: &str = "printf";
    let mut out = String::with_capacity(format.len());
    let mut args = args.into_iter();
    let mut chars = format.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let verb = chars
            .next()
            .ok_or_else(|| TemplateError::bad_argument(NAME, "format ends with '%'"))?;
        if verb == '%' {
            out.push('%');
            continue;
        }

        let arg = args.next().ok_or_else(|| {
            TemplateError::bad_argument(NAME, format!("missing argument for %{verb}"))
        })?;

        match (verb, &arg) {
            ('s', Value::Str(s)) => out.push_str(s),
            ('d', Value::Int(i)) => out.push_str(&i.to_string()),
            ('v', value) => out.push_str(&value.to_string()),
            ('q', Value::Str(s)) => out.push_str(&format!("{s:?}")),
            ('s' | 'd' | 'q', other) => {
                return Err(TemplateError::bad_argument(
                    NAME,
                    format!("%{verb} cannot format {}", other.type_name()),
                ));
            }
            (other, _) => {
                return Err(TemplateError::bad_argument(
                    NAME,
                    format!("unsupported verb %{other}"),
                ));
            }
        }
    }

    let extra = args.count();
    if extra > 0 {
        return Err(TemplateError::bad_argument(
            NAME,
            format!("{extra} extra argument(s) for format"),
        ));
    }

    Ok(out)
}
