/// Outcome of a secondary computation that must never fail a request.
///
/// `Degraded` still carries a well-formed neutral value (zeros, an empty
/// list) together with the reason the real value could not be produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Derived<T> {
    Computed(T),
    Degraded { value: T, reason: String },
}

impl<T> Derived<T> {
    pub fn degraded(value: T, reason: impl Into<String>) -> Self {
        Derived::Degraded {
            value,
            reason: reason.into(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Derived::Degraded { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Derived::Computed(_) => None,
            Derived::Degraded { reason, .. } => Some(reason),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Derived::Computed(value) | Derived::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Derived::Computed(value) | Derived::Degraded { value, .. } => value,
        }
    }
}
