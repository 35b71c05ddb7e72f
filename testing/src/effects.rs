//! Execute effects without a store
//!
//! Lets reducer tests check what an effect does once it runs: the futures
//! are awaited in place and the actions they produce are returned instead of
//! being fed back. Delays are not waited for.

use billetterie_core::effect::Effect;
use std::future::Future;
use std::pin::Pin;

/// Run `effects` in declaration order and collect the actions they produce.
///
/// `Parallel` groups are run one after another, so the result order is
/// deterministic.
///
/// # Example
///
/// ```ignore
/// let effects = reducer.reduce(&mut state, CheckoutAction::Submit { checkout_id, request_id }, &env);
/// let actions = run_effects(effects.into_vec()).await;
/// assert!(matches!(actions.as_slice(), [CheckoutAction::Submitted { .. }]));
/// ```
pub fn run_effects<A>(effects: Vec<Effect<A>>) -> Pin<Box<dyn Future<Output = Vec<A>> + Send>>
where
    A: Send + 'static,
{
    Box::pin(async move {
        let mut actions = Vec::new();
        for effect in effects {
            match effect {
                Effect::None => {},
                Effect::Future(fut) => actions.extend(fut.await),
                Effect::Delay { action, .. } => actions.push(*action),
                Effect::Parallel(inner) | Effect::Sequential(inner) => {
                    actions.extend(run_effects(inner).await);
                },
            }
        }
        actions
    })
}
