//! Macros for declaring state enumerations.

/// Generate a [`State`](crate::core::State) implementation for a plain enum.
///
/// Optional sections classify variants as initial or final and declare
/// composite states (aliases for membership in a set of other states).
/// Variants not listed default to [`StateType::Normal`](crate::core::StateType)
/// with no composition.
///
/// # Example
///
/// ```
/// use switchyard::state_enum;
///
/// state_enum! {
///     pub enum PlayerState {
///         Idle,
///         Playing,
///         Paused,
///         Stopped,
///         Halted,
///     }
///     initial: [Idle]
///     final: [Halted]
///     composite: { Stopped => [Idle, Paused] }
/// }
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }

        $(initial: [$($initial:ident),* $(,)?])?
        $(final: [$($final:ident),* $(,)?])?
        $(composite: { $($composite:ident => [$($sub:ident),* $(,)?]),* $(,)? })?
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }

            #[allow(unreachable_patterns)]
            fn state_type(&self) -> $crate::core::StateType {
                match self {
                    $($(Self::$initial => $crate::core::StateType::Initial,)*)?
                    $($(Self::$final => $crate::core::StateType::Final,)*)?
                    _ => $crate::core::StateType::Normal,
                }
            }

            #[allow(unreachable_patterns)]
            fn composed_of(&self) -> Vec<Self> {
                match self {
                    $($(Self::$composite => vec![$(Self::$sub),*],)*)?
                    _ => Vec::new(),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{State, StateType};

    state_enum! {
        enum TestState {
            Idle,
            Active,
            Paused,
            Done,
        }
        initial: [Idle]
        final: [Done]
        composite: { Paused => [Idle, Active] }
    }

    #[test]
    fn macro_generates_state_impl() {
        assert_eq!(TestState::Idle.name(), "Idle");
        assert_eq!(TestState::Idle.state_type(), StateType::Initial);
        assert_eq!(TestState::Active.state_type(), StateType::Normal);
        assert_eq!(TestState::Done.state_type(), StateType::Final);
        assert_eq!(
            TestState::Paused.composed_of(),
            vec![TestState::Idle, TestState::Active]
        );
    }

    #[test]
    fn macro_supports_visibility() {
        state_enum! {
            pub enum PublicState {
                A,
                B,
            }
            final: [B]
        }

        assert_eq!(PublicState::A.state_type(), StateType::Normal);
        assert_eq!(PublicState::B.state_type(), StateType::Final);
    }

    #[test]
    fn macro_works_with_no_sections() {
        state_enum! {
            enum MinimalState {
                One,
                Two,
            }
        }

        assert_eq!(MinimalState::One.state_type(), StateType::Normal);
        assert!(MinimalState::Two.composed_of().is_empty());
    }
}
