//! Structured GLSL expressions.
//!
//! Expressions are immutable trees that are only ever turned into text. Nothing
//! is evaluated or type checked; the tree exists so that rendering can insert
//! parentheses where operator precedence requires them:
//!
//! ```text
//!   (a + b) * c   ──▶ Binary(Mul, Binary(Add, a, b), c) ──▶ "(a + b) * c"
//!   a + b * c     ──▶ Binary(Add, a, Binary(Mul, b, c)) ──▶ "a + b * c"
//! ```

use std::fmt;

/// Binary operators understood by the emitter, ordered loosely by GLSL precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Mul,
    Div,
    Add,
    Sub,
    Shl,
    Shr,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    fn precedence(self) -> u8 {
        match self {
            BinaryOp::Mul | BinaryOp::Div => 10,
            BinaryOp::Add | BinaryOp::Sub => 9,
            BinaryOp::Shl | BinaryOp::Shr => 8,
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => 7,
            BinaryOp::Eq | BinaryOp::Ne => 6,
            BinaryOp::And => 5,
            BinaryOp::Or => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

/// Plain or compound assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Set,
    Add,
    Sub,
    Mul,
    Div,
}

impl AssignOp {
    pub fn symbol(self) -> &'static str {
        match self {
            AssignOp::Set => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
        }
    }
}

const PREC_ASSIGN: u8 = 1;
const PREC_UNARY: u8 = 11;
const PREC_POSTFIX: u8 = 12;
const PREC_ATOM: u8 = 13;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Pre-rendered literal text such as `1.0`, `3` or `true`.
    Literal(String),
    /// Verbatim source text that is not a single operand, e.g. `a + b`.
    /// Always grouped when it appears inside another expression.
    Raw(String),
    /// A bare identifier: variable, builtin or type name.
    Ident(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
    Member {
        base: Box<Expr>,
        member: String,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Expr::Literal(text.into())
    }

    pub fn binary(op: BinaryOp, lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs.into()),
            rhs: Box::new(rhs.into()),
        }
    }

    pub fn unary(op: UnaryOp, operand: impl Into<Expr>) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand.into()),
        }
    }

    pub fn assignment(op: AssignOp, target: impl Into<Expr>, value: impl Into<Expr>) -> Self {
        Expr::Assign {
            op,
            target: Box::new(target.into()),
            value: Box::new(value.into()),
        }
    }

    /// Renders the expression as GLSL source text.
    pub fn text(&self) -> String {
        self.to_string()
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Raw(_) => 0,
            Expr::Literal(text) if text.starts_with(['-', '!']) => PREC_UNARY,
            Expr::Literal(_) | Expr::Ident(_) | Expr::Call { .. } => PREC_ATOM,
            Expr::Member { .. } | Expr::Index { .. } => PREC_POSTFIX,
            Expr::Unary { .. } => PREC_UNARY,
            Expr::Binary { op, .. } => op.precedence(),
            Expr::Assign { .. } => PREC_ASSIGN,
        }
    }

    /// True when the rendered text begins with `-` or `!`.
    fn leads_with_operator(&self) -> bool {
        match self {
            Expr::Unary { .. } => true,
            Expr::Literal(text) => text.starts_with(['-', '!']),
            _ => false,
        }
    }
}

/// True when `text` reads as one operand: an identifier, number, call, member
/// or index chain, or a fully bracketed group, optionally behind a `-` or `!`.
fn is_operand(text: &str) -> bool {
    let body = text.strip_prefix(['-', '!']).unwrap_or(text);
    if body.is_empty() {
        return false;
    }

    let mut depth = 0usize;
    for c in body.chars() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => match depth.checked_sub(1) {
                Some(inner) => depth = inner,
                None => return false,
            },
            _ if depth > 0 => {}
            c if c.is_ascii_alphanumeric() || c == '_' || c == '.' => {}
            _ => return false,
        }
    }
    depth == 0
}

/// Writes `expr`, wrapping it in parentheses when it binds looser than `min`.
fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, min: u8) -> fmt::Result {
    if expr.precedence() < min {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(text) | Expr::Ident(text) | Expr::Raw(text) => f.write_str(text),
            Expr::Unary { op, operand } => {
                f.write_str(op.symbol())?;
                // `--x` would lex as a decrement.
                if operand.leads_with_operator() {
                    write!(f, "({operand})")
                } else {
                    write_operand(f, operand, PREC_UNARY)
                }
            }
            Expr::Binary { op, lhs, rhs } => {
                let prec = op.precedence();
                // Left associative: an equal-precedence right operand needs grouping.
                write_operand(f, lhs, prec)?;
                write!(f, " {} ", op.symbol())?;
                write_operand(f, rhs, prec + 1)
            }
            Expr::Call { name, args } => {
                write!(f, "{name}(")?;
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            Expr::Member { base, member } => {
                write_operand(f, base, PREC_POSTFIX)?;
                write!(f, ".{member}")
            }
            Expr::Index { base, index } => {
                write_operand(f, base, PREC_POSTFIX)?;
                write!(f, "[{index}]")
            }
            Expr::Assign { op, target, value } => {
                write_operand(f, target, PREC_UNARY)?;
                write!(f, " {} ", op.symbol())?;
                write_operand(f, value, PREC_ASSIGN + 1)
            }
        }
    }
}

impl From<f32> for Expr {
    fn from(value: f32) -> Self {
        // Debug formatting always keeps a decimal point or exponent.
        Expr::Literal(format!("{value:?}"))
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::Literal(format!("{value:?}"))
    }
}

impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        Expr::Literal(value.to_string())
    }
}

impl From<u32> for Expr {
    fn from(value: u32) -> Self {
        Expr::Literal(value.to_string())
    }
}

impl From<usize> for Expr {
    fn from(value: usize) -> Self {
        Expr::Literal(value.to_string())
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Expr::Literal(value.to_string())
    }
}

/// Text is taken verbatim. Anything but a single operand becomes
/// [`Expr::Raw`] and is parenthesised where precedence requires it.
impl From<&str> for Expr {
    fn from(text: &str) -> Self {
        Expr::from(text.to_owned())
    }
}

impl From<String> for Expr {
    fn from(text: String) -> Self {
        if text.is_empty() || is_operand(&text) {
            Expr::Literal(text)
        } else {
            Expr::Raw(text)
        }
    }
}

impl From<&Expr> for Expr {
    fn from(expr: &Expr) -> Self {
        expr.clone()
    }
}

/// Composition helpers shared by [`Expr`] and [`crate::Variable`].
///
/// Every method borrows its receiver and produces a fresh [`Expr`], so the same
/// variable can appear in any number of statements.
pub trait Compose {
    fn to_expr(&self) -> Expr;

    /// Member or swizzle access, `expr.name`.
    fn member(&self, name: &str) -> Expr {
        Expr::Member {
            base: Box::new(self.to_expr()),
            member: name.to_owned(),
        }
    }

    fn index(&self, index: impl Into<Expr>) -> Expr {
        Expr::Index {
            base: Box::new(self.to_expr()),
            index: Box::new(index.into()),
        }
    }

    fn normalize(&self) -> Expr {
        call("normalize", [self.to_expr()])
    }

    fn length(&self) -> Expr {
        call("length", [self.to_expr()])
    }

    fn dot(&self, other: impl Into<Expr>) -> Expr {
        call("dot", [self.to_expr(), other.into()])
    }

    fn cross(&self, other: impl Into<Expr>) -> Expr {
        call("cross", [self.to_expr(), other.into()])
    }

    fn pow(&self, power: impl Into<Expr>) -> Expr {
        call("pow", [self.to_expr(), power.into()])
    }

    fn mix(&self, other: impl Into<Expr>, factor: impl Into<Expr>) -> Expr {
        call("mix", [self.to_expr(), other.into(), factor.into()])
    }

    /// Clamps into `[0, 1]`.
    fn saturate(&self) -> Expr {
        call(
            "clamp",
            [self.to_expr(), Expr::from(0.0_f32), Expr::from(1.0_f32)],
        )
    }

    fn equals(&self, rhs: impl Into<Expr>) -> Expr {
        Expr::binary(BinaryOp::Eq, self.to_expr(), rhs)
    }

    fn not_equals(&self, rhs: impl Into<Expr>) -> Expr {
        Expr::binary(BinaryOp::Ne, self.to_expr(), rhs)
    }

    fn lt(&self, rhs: impl Into<Expr>) -> Expr {
        Expr::binary(BinaryOp::Lt, self.to_expr(), rhs)
    }

    fn gt(&self, rhs: impl Into<Expr>) -> Expr {
        Expr::binary(BinaryOp::Gt, self.to_expr(), rhs)
    }

    fn le(&self, rhs: impl Into<Expr>) -> Expr {
        Expr::binary(BinaryOp::Le, self.to_expr(), rhs)
    }

    fn ge(&self, rhs: impl Into<Expr>) -> Expr {
        Expr::binary(BinaryOp::Ge, self.to_expr(), rhs)
    }

    fn assign(&self, value: impl Into<Expr>) -> Expr {
        Expr::assignment(AssignOp::Set, self.to_expr(), value)
    }

    fn assign_add(&self, value: impl Into<Expr>) -> Expr {
        Expr::assignment(AssignOp::Add, self.to_expr(), value)
    }

    fn assign_sub(&self, value: impl Into<Expr>) -> Expr {
        Expr::assignment(AssignOp::Sub, self.to_expr(), value)
    }

    fn assign_mul(&self, value: impl Into<Expr>) -> Expr {
        Expr::assignment(AssignOp::Mul, self.to_expr(), value)
    }

    fn assign_div(&self, value: impl Into<Expr>) -> Expr {
        Expr::assignment(AssignOp::Div, self.to_expr(), value)
    }
}

impl Compose for Expr {
    fn to_expr(&self) -> Expr {
        self.clone()
    }
}

/// Generic function call, `name(arg0, arg1, ...)`.
pub fn call<I, A>(name: &str, args: I) -> Expr
where
    I: IntoIterator<Item = A>,
    A: Into<Expr>,
{
    Expr::Call {
        name: name.to_owned(),
        args: args.into_iter().map(Into::into).collect(),
    }
}

pub fn vec2(x: impl Into<Expr>, y: impl Into<Expr>) -> Expr {
    call("vec2", [x.into(), y.into()])
}

pub fn vec3(x: impl Into<Expr>, y: impl Into<Expr>, z: impl Into<Expr>) -> Expr {
    call("vec3", [x.into(), y.into(), z.into()])
}

pub fn vec4(
    x: impl Into<Expr>,
    y: impl Into<Expr>,
    z: impl Into<Expr>,
    w: impl Into<Expr>,
) -> Expr {
    call("vec4", [x.into(), y.into(), z.into(), w.into()])
}

/// Column-major `mat3` from three column vectors.
pub fn mat3(c0: impl Into<Expr>, c1: impl Into<Expr>, c2: impl Into<Expr>) -> Expr {
    call("mat3", [c0.into(), c1.into(), c2.into()])
}

/// `texture(sampler, coordinate)` lookup.
pub fn texture(sampler: impl Into<Expr>, coordinate: impl Into<Expr>) -> Expr {
    call("texture", [sampler.into(), coordinate.into()])
}

/// Implements the arithmetic operator traits for an operand type that converts
/// into [`Expr`].
macro_rules! impl_operators {
    ($($ty:ty),* $(,)?) => {$(
        impl<R: Into<$crate::expr::Expr>> ::std::ops::Add<R> for $ty {
            type Output = $crate::expr::Expr;
            fn add(self, rhs: R) -> Self::Output {
                $crate::expr::Expr::binary($crate::expr::BinaryOp::Add, self, rhs)
            }
        }

        impl<R: Into<$crate::expr::Expr>> ::std::ops::Sub<R> for $ty {
            type Output = $crate::expr::Expr;
            fn sub(self, rhs: R) -> Self::Output {
                $crate::expr::Expr::binary($crate::expr::BinaryOp::Sub, self, rhs)
            }
        }

        impl<R: Into<$crate::expr::Expr>> ::std::ops::Mul<R> for $ty {
            type Output = $crate::expr::Expr;
            fn mul(self, rhs: R) -> Self::Output {
                $crate::expr::Expr::binary($crate::expr::BinaryOp::Mul, self, rhs)
            }
        }

        impl<R: Into<$crate::expr::Expr>> ::std::ops::Div<R> for $ty {
            type Output = $crate::expr::Expr;
            fn div(self, rhs: R) -> Self::Output {
                $crate::expr::Expr::binary($crate::expr::BinaryOp::Div, self, rhs)
            }
        }

        impl<R: Into<$crate::expr::Expr>> ::std::ops::Shl<R> for $ty {
            type Output = $crate::expr::Expr;
            fn shl(self, rhs: R) -> Self::Output {
                $crate::expr::Expr::binary($crate::expr::BinaryOp::Shl, self, rhs)
            }
        }

        impl<R: Into<$crate::expr::Expr>> ::std::ops::Shr<R> for $ty {
            type Output = $crate::expr::Expr;
            fn shr(self, rhs: R) -> Self::Output {
                $crate::expr::Expr::binary($crate::expr::BinaryOp::Shr, self, rhs)
            }
        }

        impl ::std::ops::Neg for $ty {
            type Output = $crate::expr::Expr;
            fn neg(self) -> Self::Output {
                $crate::expr::Expr::unary($crate::expr::UnaryOp::Neg, self)
            }
        }
    )*};
}

pub(crate) use impl_operators;

impl_operators!(Expr, &Expr);

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> Expr {
        Expr::ident(name)
    }

    #[test]
    fn binary_operators_render_with_spaces() {
        assert_eq!((id("a") + id("b")).text(), "a + b");
        assert_eq!((id("a") - 1.0_f32).text(), "a - 1.0");
        assert_eq!((id("a") << 2).text(), "a << 2");
        assert_eq!(id("a").ge(0.5_f32).text(), "a >= 0.5");
    }

    #[test]
    fn precedence_inserts_parentheses_only_where_needed() {
        let sum = id("a") + id("b");
        assert_eq!((sum.clone() * id("c")).text(), "(a + b) * c");
        assert_eq!((id("a") + id("b") * id("c")).text(), "a + b * c");
        assert_eq!((id("a") - (id("b") - id("c"))).text(), "a - (b - c)");
        assert_eq!((id("a") - id("b") - id("c")).text(), "a - b - c");
        assert_eq!(sum.member("x").text(), "(a + b).x");
        assert_eq!((-sum).text(), "-(a + b)");
    }

    #[test]
    fn assignments_and_intrinsics() {
        let color = id("color");
        assert_eq!(color.member("rgb").assign_mul(id("light")).text(), "color.rgb *= light");
        assert_eq!(id("n").dot(id("l")).saturate().text(), "clamp(dot(n, l), 0.0, 1.0)");
        assert_eq!(id("x").pow(16.0_f32).text(), "pow(x, 16.0)");
        assert_eq!(id("a").mix(id("b"), 0.25_f32).text(), "mix(a, b, 0.25)");
        assert_eq!(
            vec4(id("p"), 1.0_f32, "0", 1).text(),
            "vec4(p, 1.0, 0, 1)"
        );
    }

    #[test]
    fn float_literals_always_carry_a_decimal_point() {
        assert_eq!(Expr::from(1.0_f32).text(), "1.0");
        assert_eq!(Expr::from(0.001_f32).text(), "0.001");
        assert_eq!(Expr::from(1000.0_f64).text(), "1000.0");
        assert_eq!(Expr::from(-1.0_f32).text(), "-1.0");
    }

    #[test]
    fn nested_negation_never_becomes_a_decrement() {
        assert_eq!((-(-id("x"))).text(), "-(-x)");
        assert_eq!((-Expr::from(-1.0_f32)).text(), "-(-1.0)");
        assert_eq!((-Expr::from("!done")).text(), "-(!done)");
        assert_eq!((-id("x")).text(), "-x");
        assert_eq!((id("a") * -id("x")).text(), "a * -x");
    }

    #[test]
    fn compound_text_is_grouped() {
        assert_eq!((Expr::from("a + b") * id("c")).text(), "(a + b) * c");
        assert_eq!((id("c") - "a - b").text(), "c - (a - b)");
        assert_eq!(Expr::from("a + b").member("x").text(), "(a + b).x");
        assert_eq!(id("p").assign("a + b").text(), "p = (a + b)");
    }

    #[test]
    fn operand_text_stays_bare() {
        for text in ["u_light", "0", "1.5", "gl_in[0].gl_Position", "texture(s, uv).rgb", "(a + b)"] {
            assert_eq!(Expr::from(text), Expr::Literal(text.to_owned()));
            assert_eq!((Expr::from(text) * id("c")).text(), format!("{text} * c"));
        }
        assert_eq!(Expr::from("(a) + (b)"), Expr::Raw("(a) + (b)".to_owned()));
        assert_eq!(Expr::from("a)("), Expr::Raw("a)(".to_owned()));
    }
}
