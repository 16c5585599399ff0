//! Values produced by evaluation.

use crate::State;
use fmt_util::comma_seq;
use sml_lab::Lab;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use str_util::{Name, SmolStr};

/// A value.
#[derive(Debug, Clone)]
pub enum Val {
  /// An `int`.
  Int(i32),
  /// A `word`.
  Word(u32),
  /// A `real`.
  Real(f64),
  /// A `char`.
  Char(char),
  /// A `string`.
  String(SmolStr),
  /// `true` or `false`.
  Bool(bool),
  /// A record. The empty record is `()`.
  Record(BTreeMap<Lab, Val>),
  /// A function made by `fn` or `fun`.
  Closure(Rc<Closure>),
  /// A datatype constructor, applied to its argument if it has one.
  Con(Con),
  /// An exception, applied to its argument if it has one.
  Exn(Con),
  /// A datatype constructor that takes an argument, not yet applied.
  ConFn(Name, u32),
  /// An exception constructor that takes an argument, not yet applied.
  ExnFn(Name, u32),
  /// A function implemented natively.
  Builtin(Builtin),
  /// A `ref` cell.
  Ref(Rc<RefCell<Val>>),
}

impl Val {
  /// Returns the unit value.
  #[must_use]
  pub fn unit() -> Self {
    Self::Record(BTreeMap::new())
  }

  /// Returns the tuple of the values.
  #[must_use]
  pub fn tuple<I>(iter: I) -> Self
  where
    I: IntoIterator<Item = Val>,
  {
    Self::Record(iter.into_iter().enumerate().map(|(idx, val)| (Lab::tuple(idx), val)).collect())
  }

  /// Returns a nullary exception value.
  #[must_use]
  pub fn exn(name: &str, id: u32) -> Self {
    Self::Exn(Con { name: Name::new(name), id, arg: None })
  }

  /// Returns the list of the values.
  #[must_use]
  pub fn list<I>(iter: I) -> Self
  where
    I: IntoIterator<Item = Val>,
    I::IntoIter: DoubleEndedIterator,
  {
    let nil = Val::Con(Con { name: Name::new("nil"), id: 0, arg: None });
    iter.into_iter().rev().fold(nil, |ac, val| {
      let arg = Val::tuple([val, ac]);
      Val::Con(Con { name: Name::new("::"), id: 0, arg: Some(Box::new(arg)) })
    })
  }

  /// Returns the elements if this is a list.
  #[must_use]
  pub fn as_list(&self) -> Option<Vec<&Val>> {
    let mut ret = Vec::new();
    let mut cur = self;
    loop {
      let Val::Con(con) = cur else { return None };
      if con.id != 0 {
        return None;
      }
      match (con.name.as_str(), &con.arg) {
        ("nil", None) => return Some(ret),
        ("::", Some(arg)) => {
          let Val::Record(rows) = arg.as_ref() else { return None };
          ret.push(rows.get(&Lab::tuple(0))?);
          cur = rows.get(&Lab::tuple(1))?;
        }
        _ => return None,
      }
    }
  }
}

/// A constructed value, or an exception.
#[derive(Debug, Clone)]
pub struct Con {
  /// The constructor name.
  pub name: Name,
  /// The generation id, distinguishing same-named constructors from different declarations.
  pub id: u32,
  /// The argument.
  pub arg: Option<Box<Val>>,
}

impl Con {
  /// Returns whether this has the same constructor as `other`.
  #[must_use]
  pub fn same_con(&self, other: &Con) -> bool {
    self.name == other.name && self.id == other.id
  }
}

/// A closure.
#[derive(Debug)]
pub struct Closure {
  /// The state the closure was made in.
  pub state: State,
  /// The functions of the recursive group this closure belongs to, re-installed at each call.
  pub rec: Rc<[(Name, Rc<sml_hir::Match>)]>,
  /// The body.
  pub body: Rc<sml_hir::Match>,
}

macro_rules! builtins {
  ($($variant:ident => $s:literal,)*) => {
    /// A function implemented natively.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[allow(missing_docs)]
    pub enum Builtin {
      $($variant,)*
    }

    impl Builtin {
      /// All of the builtins.
      pub const ALL: &'static [Builtin] = &[$(Builtin::$variant,)*];

      /// Returns the name of this, for display.
      #[must_use]
      pub fn as_str(self) -> &'static str {
        match self {
          $(Builtin::$variant => $s,)*
        }
      }
    }
  };
}

builtins! {
  Add => "+",
  Sub => "-",
  Mul => "*",
  Div => "div",
  Mod => "mod",
  RealDiv => "/",
  Neg => "~",
  Abs => "abs",
  Lt => "<",
  Le => "<=",
  Gt => ">",
  Ge => ">=",
  Eq => "=",
  Ne => "<>",
  Concat => "^",
  Explode => "explode",
  Implode => "implode",
  Print => "print",
  Assign => ":=",
  Deref => "!",
  Ref => "ref",
  Ord => "ord",
  Chr => "chr",
  Size => "size",
  Substring => "substring",
  StringSub => "String.sub",
  IntToString => "Int.toString",
  RealToString => "Real.toString",
  WordToString => "Word.toString",
  RealFromInt => "real",
  Floor => "floor",
  Ceil => "ceil",
  Round => "round",
  Trunc => "trunc",
  WordFromInt => "Word.fromInt",
  WordToInt => "Word.toInt",
  Andb => "Word.andb",
  Orb => "Word.orb",
  Xorb => "Word.xorb",
  Shl => "Word.<<",
  Shr => "Word.>>",
  Sqrt => "Math.sqrt",
  Sin => "Math.sin",
  Cos => "Math.cos",
  Tan => "Math.tan",
  Asin => "Math.asin",
  Acos => "Math.acos",
  Atan => "Math.atan",
  Atan2 => "Math.atan2",
  Exp => "Math.exp",
  Ln => "Math.ln",
  Log10 => "Math.log10",
  Pow => "Math.pow",
}

/// Returns a value that displays `val` in SML syntax.
#[must_use]
pub fn display_val(val: &Val) -> ValDisplay<'_> {
  ValDisplay { val, atomic: false }
}

/// Displays a value in SML syntax.
#[derive(Debug, Clone, Copy)]
pub struct ValDisplay<'a> {
  val: &'a Val,
  atomic: bool,
}

impl fmt::Display for ValDisplay<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.val {
      Val::Int(n) => sml_scon::fmt_int(f, i64::from(*n)),
      Val::Word(w) => write!(f, "0w{w}"),
      Val::Real(r) => sml_scon::fmt_real(f, *r),
      Val::Char(c) => {
        f.write_str("#")?;
        sml_scon::fmt_string(f, c.encode_utf8(&mut [0u8; 4]))
      }
      Val::String(s) => sml_scon::fmt_string(f, s),
      Val::Bool(b) => b.fmt(f),
      Val::Record(rows) => {
        if Lab::is_tuple(rows.keys()) {
          f.write_str("(")?;
          comma_seq(f, rows.values().map(display_val))?;
          return f.write_str(")");
        }
        f.write_str("{ ")?;
        comma_seq(f, rows.iter().map(|(lab, val)| RowDisplay { lab, val }))?;
        f.write_str(" }")
      }
      Val::Closure(_) | Val::Builtin(_) => f.write_str("fn"),
      Val::Con(con) | Val::Exn(con) => {
        if let Some(vals) = self.val.as_list() {
          f.write_str("[")?;
          comma_seq(f, vals.into_iter().map(display_val))?;
          return f.write_str("]");
        }
        match &con.arg {
          None => con_name(f, &con.name, con.id),
          Some(arg) => {
            if self.atomic {
              f.write_str("(")?;
            }
            if con.name.as_str() == "::" && con.id == 0 {
              if let Val::Record(rows) = arg.as_ref() {
                if let (Some(hd), Some(tl)) = (rows.get(&Lab::tuple(0)), rows.get(&Lab::tuple(1))) {
                  write!(f, "{} :: {}", ValDisplay { val: hd, atomic: true }, display_val(tl))?;
                }
              }
            } else {
              con_name(f, &con.name, con.id)?;
              write!(f, " {}", ValDisplay { val: arg, atomic: true })?;
            }
            if self.atomic {
              f.write_str(")")?;
            }
            Ok(())
          }
        }
      }
      Val::ConFn(name, id) | Val::ExnFn(name, id) => con_name(f, name, *id),
      Val::Ref(cell) => {
        if self.atomic {
          f.write_str("(")?;
        }
        write!(f, "ref {}", ValDisplay { val: &cell.borrow(), atomic: true })?;
        if self.atomic {
          f.write_str(")")?;
        }
        Ok(())
      }
    }
  }
}

fn con_name(f: &mut fmt::Formatter<'_>, name: &Name, id: u32) -> fmt::Result {
  if id == 0 { f.write_str(name.as_str()) } else { write!(f, "{name}/{id}") }
}

struct RowDisplay<'a> {
  lab: &'a Lab,
  val: &'a Val,
}

impl fmt::Display for RowDisplay<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} = {}", self.lab, display_val(self.val))
  }
}
