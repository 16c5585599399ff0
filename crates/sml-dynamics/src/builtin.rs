//! Functions implemented natively.
//!
//! Ints are 31 bits and words are 31 bits unsigned. Results outside those ranges raise `Overflow`.

use crate::error::ErrorKind;
use crate::types::{Result, St, Step};
use sml_lab::Lab;
use sml_scon::{MAX_INT, MAX_WORD, MIN_INT};
use sml_state::{Builtin, Val};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;
use str_util::SmolStr;

enum Out {
  Val(Val),
  /// Raise the builtin exception with this name.
  Raise(&'static str),
  WrongArg,
}

pub(crate) fn apply(st: &mut St<'_>, builtin: Builtin, arg: Val) -> Result<Step> {
  match get(&mut st.output, builtin, arg) {
    Out::Val(val) => Ok(Step::Val(val)),
    Out::Raise(name) => Ok(Step::Raise(Val::exn(name, 0))),
    Out::WrongArg => Err(st.err(ErrorKind::WrongArg(builtin))),
  }
}

#[allow(clippy::too_many_lines)]
fn get(output: &mut Vec<String>, builtin: Builtin, arg: Val) -> Out {
  match builtin {
    Builtin::Add => arith(arg, |a, b| a + b, |a, b| a + b),
    Builtin::Sub => arith(arg, |a, b| a - b, |a, b| a - b),
    Builtin::Mul => arith(arg, |a, b| a * b, |a, b| a * b),
    Builtin::Div => div_mod(arg, floor_div),
    Builtin::Mod => div_mod(arg, |a, b| a - b * floor_div(a, b)),
    Builtin::RealDiv => match pair(arg) {
      Some((Val::Real(a), Val::Real(b))) => Out::Val(Val::Real(a / b)),
      _ => Out::WrongArg,
    },
    Builtin::Neg => match arg {
      Val::Int(n) => int(-i64::from(n)),
      Val::Real(x) => Out::Val(Val::Real(-x)),
      _ => Out::WrongArg,
    },
    Builtin::Abs => match arg {
      Val::Int(n) => int(i64::from(n).abs()),
      Val::Real(x) => Out::Val(Val::Real(x.abs())),
      _ => Out::WrongArg,
    },
    Builtin::Lt => compare(arg, Ordering::is_lt),
    Builtin::Le => compare(arg, Ordering::is_le),
    Builtin::Gt => compare(arg, Ordering::is_gt),
    Builtin::Ge => compare(arg, Ordering::is_ge),
    Builtin::Eq | Builtin::Ne => match pair(arg).and_then(|(a, b)| equal(&a, &b)) {
      Some(eq) => Out::Val(Val::Bool(eq == (builtin == Builtin::Eq))),
      None => Out::WrongArg,
    },
    Builtin::Concat => match pair(arg) {
      Some((Val::String(a), Val::String(b))) => {
        Out::Val(Val::String(SmolStr::new(format!("{a}{b}"))))
      }
      _ => Out::WrongArg,
    },
    Builtin::Explode => match arg {
      Val::String(s) => Out::Val(Val::list(s.chars().map(Val::Char))),
      _ => Out::WrongArg,
    },
    Builtin::Implode => {
      let Some(vals) = arg.as_list() else { return Out::WrongArg };
      let mut ret = String::with_capacity(vals.len());
      for val in vals {
        let Val::Char(c) = val else { return Out::WrongArg };
        ret.push(*c);
      }
      Out::Val(Val::String(SmolStr::new(ret)))
    }
    Builtin::Print => match arg {
      Val::String(s) => {
        output.push(s.to_string());
        Out::Val(Val::unit())
      }
      _ => Out::WrongArg,
    },
    Builtin::Assign => match pair(arg) {
      Some((Val::Ref(cell), val)) => {
        *cell.borrow_mut() = val;
        Out::Val(Val::unit())
      }
      _ => Out::WrongArg,
    },
    Builtin::Deref => match arg {
      Val::Ref(cell) => Out::Val(cell.borrow().clone()),
      _ => Out::WrongArg,
    },
    Builtin::Ref => Out::Val(Val::Ref(Rc::new(RefCell::new(arg)))),
    Builtin::Ord => match arg {
      Val::Char(c) => int(i64::from(u32::from(c))),
      _ => Out::WrongArg,
    },
    Builtin::Chr => match arg {
      Val::Int(n) => match u8::try_from(n) {
        Ok(b) => Out::Val(Val::Char(char::from(b))),
        Err(_) => Out::Raise("Chr"),
      },
      _ => Out::WrongArg,
    },
    Builtin::Size => match arg {
      Val::String(s) => len(s.chars().count()),
      _ => Out::WrongArg,
    },
    Builtin::Substring => match tuple::<3>(arg) {
      Some([Val::String(s), Val::Int(start), Val::Int(n)]) => {
        let (Ok(start), Ok(n)) = (usize::try_from(start), usize::try_from(n)) else {
          return Out::Raise("Subscript");
        };
        let chars: Vec<_> = s.chars().collect();
        match chars.get(start..start + n) {
          Some(cs) => Out::Val(Val::String(cs.iter().collect::<String>().into())),
          None => Out::Raise("Subscript"),
        }
      }
      _ => Out::WrongArg,
    },
    Builtin::StringSub => match pair(arg) {
      Some((Val::String(s), Val::Int(idx))) => {
        match usize::try_from(idx).ok().and_then(|idx| s.chars().nth(idx)) {
          Some(c) => Out::Val(Val::Char(c)),
          None => Out::Raise("Subscript"),
        }
      }
      _ => Out::WrongArg,
    },
    Builtin::IntToString => match arg {
      Val::Int(n) => string(IntDisplay(n)),
      _ => Out::WrongArg,
    },
    Builtin::RealToString => match arg {
      Val::Real(x) => string(RealDisplay(x)),
      _ => Out::WrongArg,
    },
    Builtin::WordToString => match arg {
      Val::Word(w) => Out::Val(Val::String(SmolStr::new(format!("{w:X}")))),
      _ => Out::WrongArg,
    },
    Builtin::RealFromInt => match arg {
      Val::Int(n) => Out::Val(Val::Real(f64::from(n))),
      _ => Out::WrongArg,
    },
    Builtin::Floor => to_int(arg, f64::floor),
    Builtin::Ceil => to_int(arg, f64::ceil),
    Builtin::Round => to_int(arg, f64::round_ties_even),
    Builtin::Trunc => to_int(arg, f64::trunc),
    Builtin::WordFromInt => match arg {
      Val::Int(n) => word(i64::from(n).rem_euclid(i64::from(MAX_WORD) + 1)),
      _ => Out::WrongArg,
    },
    Builtin::WordToInt => match arg {
      Val::Word(w) => int(i64::from(w)),
      _ => Out::WrongArg,
    },
    Builtin::Andb => bits(arg, |a, b| a & b),
    Builtin::Orb => bits(arg, |a, b| a | b),
    Builtin::Xorb => bits(arg, |a, b| a ^ b),
    Builtin::Shl => bits(arg, |a, b| if b >= 31 { 0 } else { (a << b) & MAX_WORD }),
    Builtin::Shr => bits(arg, |a, b| if b >= 31 { 0 } else { a >> b }),
    Builtin::Sqrt => math(arg, f64::sqrt),
    Builtin::Sin => math(arg, f64::sin),
    Builtin::Cos => math(arg, f64::cos),
    Builtin::Tan => math(arg, f64::tan),
    Builtin::Asin => math(arg, f64::asin),
    Builtin::Acos => math(arg, f64::acos),
    Builtin::Atan => math(arg, f64::atan),
    Builtin::Exp => math(arg, f64::exp),
    Builtin::Ln => math(arg, f64::ln),
    Builtin::Log10 => math(arg, f64::log10),
    Builtin::Atan2 => match pair(arg) {
      Some((Val::Real(a), Val::Real(b))) => Out::Val(Val::Real(a.atan2(b))),
      _ => Out::WrongArg,
    },
    Builtin::Pow => match pair(arg) {
      Some((Val::Real(a), Val::Real(b))) => Out::Val(Val::Real(a.powf(b))),
      _ => Out::WrongArg,
    },
  }
}

/// Structural equality, or `None` if either side has a function in it.
pub(crate) fn equal(a: &Val, b: &Val) -> Option<bool> {
  let ret = match (a, b) {
    (Val::Int(a), Val::Int(b)) => a == b,
    (Val::Word(a), Val::Word(b)) => a == b,
    #[allow(clippy::float_cmp)]
    (Val::Real(a), Val::Real(b)) => a == b,
    (Val::Char(a), Val::Char(b)) => a == b,
    (Val::String(a), Val::String(b)) => a == b,
    (Val::Bool(a), Val::Bool(b)) => a == b,
    (Val::Record(a), Val::Record(b)) => {
      if a.len() != b.len() {
        return Some(false);
      }
      for ((la, va), (lb, vb)) in a.iter().zip(b) {
        if la != lb || !equal(va, vb)? {
          return Some(false);
        }
      }
      true
    }
    (Val::Con(a), Val::Con(b)) | (Val::Exn(a), Val::Exn(b)) => {
      a.same_con(b)
        && match (&a.arg, &b.arg) {
          (Some(x), Some(y)) => equal(x, y)?,
          (None, None) => true,
          _ => false,
        }
    }
    (Val::Ref(a), Val::Ref(b)) => Rc::ptr_eq(a, b),
    (Val::Closure(_) | Val::Builtin(_) | Val::ConFn(..) | Val::ExnFn(..), _)
    | (_, Val::Closure(_) | Val::Builtin(_) | Val::ConFn(..) | Val::ExnFn(..)) => return None,
    _ => false,
  };
  Some(ret)
}

fn int(n: i64) -> Out {
  match i32::try_from(n) {
    Ok(n) if (MIN_INT..=MAX_INT).contains(&n) => Out::Val(Val::Int(n)),
    _ => Out::Raise("Overflow"),
  }
}

fn word(n: i64) -> Out {
  match u32::try_from(n) {
    Ok(n) if n <= MAX_WORD => Out::Val(Val::Word(n)),
    _ => Out::Raise("Overflow"),
  }
}

fn len(n: usize) -> Out {
  match i64::try_from(n) {
    Ok(n) => int(n),
    Err(_) => Out::Raise("Size"),
  }
}

fn string<T: fmt::Display>(x: T) -> Out {
  Out::Val(Val::String(SmolStr::new(x.to_string())))
}

fn pair(arg: Val) -> Option<(Val, Val)> {
  let [a, b] = tuple::<2>(arg)?;
  Some((a, b))
}

fn tuple<const N: usize>(arg: Val) -> Option<[Val; N]> {
  let Val::Record(mut rows) = arg else { return None };
  if rows.len() != N {
    return None;
  }
  let vals: Vec<_> = (0..N).map(|idx| rows.remove(&Lab::tuple(idx))).collect::<Option<_>>()?;
  vals.try_into().ok()
}

fn arith(arg: Val, int_op: fn(i64, i64) -> i64, real_op: fn(f64, f64) -> f64) -> Out {
  match pair(arg) {
    Some((Val::Int(a), Val::Int(b))) => int(int_op(a.into(), b.into())),
    Some((Val::Word(a), Val::Word(b))) => word(int_op(a.into(), b.into())),
    Some((Val::Real(a), Val::Real(b))) => Out::Val(Val::Real(real_op(a, b))),
    _ => Out::WrongArg,
  }
}

fn div_mod(arg: Val, op: fn(i64, i64) -> i64) -> Out {
  match pair(arg) {
    Some((Val::Int(_), Val::Int(0)) | (Val::Word(_), Val::Word(0))) => Out::Raise("Div"),
    Some((Val::Int(a), Val::Int(b))) => int(op(a.into(), b.into())),
    Some((Val::Word(a), Val::Word(b))) => word(op(a.into(), b.into())),
    _ => Out::WrongArg,
  }
}

/// Division rounding toward negative infinity.
fn floor_div(a: i64, b: i64) -> i64 {
  let q = a / b;
  if a % b != 0 && (a < 0) != (b < 0) { q - 1 } else { q }
}

fn compare(arg: Val, f: fn(Ordering) -> bool) -> Out {
  let ord = match pair(arg) {
    Some((Val::Int(a), Val::Int(b))) => a.partial_cmp(&b),
    Some((Val::Word(a), Val::Word(b))) => a.partial_cmp(&b),
    Some((Val::Real(a), Val::Real(b))) => a.partial_cmp(&b),
    Some((Val::Char(a), Val::Char(b))) => a.partial_cmp(&b),
    Some((Val::String(a), Val::String(b))) => a.partial_cmp(&b),
    _ => return Out::WrongArg,
  };
  // nan is unordered
  Out::Val(Val::Bool(ord.is_some_and(f)))
}

fn bits(arg: Val, op: fn(u32, u32) -> u32) -> Out {
  match pair(arg) {
    Some((Val::Word(a), Val::Word(b))) => Out::Val(Val::Word(op(a, b))),
    _ => Out::WrongArg,
  }
}

fn math(arg: Val, f: fn(f64) -> f64) -> Out {
  match arg {
    Val::Real(x) => Out::Val(Val::Real(f(x))),
    _ => Out::WrongArg,
  }
}

fn to_int(arg: Val, f: fn(f64) -> f64) -> Out {
  let Val::Real(x) = arg else { return Out::WrongArg };
  if x.is_nan() {
    return Out::Raise("Domain");
  }
  let y = f(x);
  if y < f64::from(MIN_INT) || y > f64::from(MAX_INT) {
    return Out::Raise("Overflow");
  }
  #[allow(clippy::cast_possible_truncation)]
  let n = y as i32;
  Out::Val(Val::Int(n))
}

struct IntDisplay(i32);

impl fmt::Display for IntDisplay {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    sml_scon::fmt_int(f, i64::from(self.0))
  }
}

struct RealDisplay(f64);

impl fmt::Display for RealDisplay {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    sml_scon::fmt_real(f, self.0)
  }
}
