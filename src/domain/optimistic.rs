/// Outcome of reconciling an optimistic change with the server's answer.
#[derive(Debug, PartialEq)]
pub enum OptimisticOutcome<T, E> {
    Confirmed(T),
    RolledBack { previous: T, error: E },
}

impl<T, E> OptimisticOutcome<T, E> {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, OptimisticOutcome::Confirmed(_))
    }

    /// The value now on screen.
    pub fn value(&self) -> &T {
        match self {
            OptimisticOutcome::Confirmed(value) => value,
            OptimisticOutcome::RolledBack { previous, .. } => previous,
        }
    }
}

/// A value shown to the user before the server has acknowledged it.
///
/// `displayed` may run ahead of `confirmed`; a failed save snaps it back.
#[derive(Debug, Clone)]
pub struct Optimistic<T: Clone> {
    confirmed: T,
    displayed: T,
}

impl<T: Clone> Optimistic<T> {
    pub fn new(value: T) -> Self {
        Self {
            confirmed: value.clone(),
            displayed: value,
        }
    }

    pub fn displayed(&self) -> &T {
        &self.displayed
    }

    pub fn confirmed(&self) -> &T {
        &self.confirmed
    }

    pub fn is_pending(&self) -> bool
    where
        T: PartialEq,
    {
        self.confirmed != self.displayed
    }

    /// Show `value` immediately and return the new displayed value.
    pub fn apply(&mut self, value: T) -> T {
        self.displayed = value;
        self.displayed.clone()
    }

    pub fn reconcile<E>(&mut self, result: Result<T, E>) -> OptimisticOutcome<T, E> {
        match result {
            Ok(server_value) => {
                self.confirmed = server_value.clone();
                self.displayed = server_value.clone();
                OptimisticOutcome::Confirmed(server_value)
            }
            Err(error) => {
                self.displayed = self.confirmed.clone();
                OptimisticOutcome::RolledBack {
                    previous: self.confirmed.clone(),
                    error,
                }
            }
        }
    }
}
