//! Sequential contribution pipeline over registered hooks.
//!
//! Hooks are awaited strictly one at a time, never concurrently: a later hook
//! may depend on filesystem side effects performed by an earlier hook (for
//! example, checking whether a path now exists). That sequential dependency
//! is why parallel execution is disallowed even though hooks are individually
//! asynchronous.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{HookError, Result};
use crate::hook::ApplyKind;
use crate::registry::HookRegistry;

/// Drives hook invocation against a frozen registry.
///
/// The host finishes registration, wraps the registry in an `Arc`, and hands
/// it to the pipeline; the registry is not mutated afterwards.
#[derive(Clone)]
pub struct Pipeline {
    registry: Arc<HookRegistry>,
}

impl Pipeline {
    pub fn new(registry: Arc<HookRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &HookRegistry {
        &self.registry
    }

    /// Pull all contributions for `key` through the hooks in `(stage, order)`
    /// order and combine them according to `kind`.
    ///
    /// Collector mode: the accumulator starts as `initial` (must be a
    /// sequence). A hook returning a sequence has it concatenated onto the
    /// accumulator, a scalar is appended as a single element, and a null or
    /// absent return leaves the accumulator unchanged. Contributions are
    /// never interleaved or reordered.
    ///
    /// Reducer mode: the accumulator starts as `initial`; each hook's
    /// non-absent return replaces it before the next hook runs. With zero
    /// registered hooks the seed comes back unchanged.
    ///
    /// # Errors
    ///
    /// The first hook failure aborts the apply; remaining hooks for the key
    /// do not run.
    pub async fn apply(
        &self,
        key: &str,
        kind: ApplyKind,
        initial: Value,
        extra: Option<Value>,
    ) -> Result<Value> {
        if kind == ApplyKind::Collector && !initial.is_array() {
            return Err(HookError::SeedNotSequence { key: key.into() });
        }

        let hooks = self.registry.lookup(key);
        trace!(key, ?kind, hooks = hooks.len(), "applying hooks");

        let mut acc = initial;
        for hook in hooks {
            let ret = (hook.f)(acc.clone(), extra.clone())
                .await
                .map_err(|source| HookError::HookFailed {
                    key: key.into(),
                    order: hook.order,
                    source,
                })?;
            acc = combine(kind, acc, ret);
        }
        Ok(acc)
    }

    /// Run every hook for `key` in `(stage, order)` order for side effects
    /// only; return values are ignored.
    ///
    /// This is the ordered-event kind (`onGenerateFiles`): finalize-stage
    /// handlers run after all default-stage handlers and therefore observe
    /// every file those handlers wrote.
    pub async fn fire(&self, key: &str, extra: Option<Value>) -> Result<()> {
        let hooks = self.registry.lookup(key);
        debug!(key, hooks = hooks.len(), "firing event hooks");

        for hook in hooks {
            (hook.f)(Value::Null, extra.clone())
                .await
                .map_err(|source| HookError::HookFailed {
                    key: key.into(),
                    order: hook.order,
                    source,
                })?;
        }
        Ok(())
    }
}

fn combine(kind: ApplyKind, acc: Value, ret: Option<Value>) -> Value {
    match kind {
        ApplyKind::Collector => {
            let Value::Array(mut items) = acc else {
                // Checked at the top of apply.
                unreachable!("collector accumulator is always a sequence");
            };
            match ret {
                Some(Value::Array(contributed)) => items.extend(contributed),
                Some(Value::Null) | None => {}
                Some(scalar) => items.push(scalar),
            }
            Value::Array(items)
        }
        ApplyKind::Reducer => match ret {
            Some(next) => next,
            None => acc,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::Stage;
    use serde_json::json;
    use std::time::Duration;

    fn pipeline(build: impl FnOnce(&mut HookRegistry)) -> Pipeline {
        let mut registry = HookRegistry::new();
        build(&mut registry);
        Pipeline::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn collector_concatenates_in_registration_order() {
        let p = pipeline(|r| {
            // Slow hook first: ordering must follow registration, not
            // completion timing.
            r.register("imports", Stage::Default, |_, _| async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(Some(json!(["a", "b"])))
            });
            r.register("imports", Stage::Default, |_, _| async {
                Ok(Some(json!(["c"])))
            });
        });

        let out = p
            .apply("imports", ApplyKind::Collector, json!(["seed"]), None)
            .await
            .unwrap();
        assert_eq!(out, json!(["seed", "a", "b", "c"]));
    }

    #[tokio::test]
    async fn collector_skips_empty_and_null_returns() {
        let p = pipeline(|r| {
            r.register("k", Stage::Default, |_, _| async { Ok(Some(json!([]))) });
            r.register("k", Stage::Default, |_, _| async { Ok(None) });
            r.register("k", Stage::Default, |_, _| async {
                Ok(Some(Value::Null))
            });
            r.register("k", Stage::Default, |_, _| async { Ok(Some(json!("x"))) });
        });

        let out = p
            .apply("k", ApplyKind::Collector, json!([]), None)
            .await
            .unwrap();
        assert_eq!(out, json!(["x"]));
    }

    #[tokio::test]
    async fn collector_rejects_non_sequence_seed() {
        let p = pipeline(|_| {});
        let err = p
            .apply("k", ApplyKind::Collector, json!(42), None)
            .await
            .unwrap_err();
        assert!(matches!(err, HookError::SeedNotSequence { .. }));
    }

    #[tokio::test]
    async fn reducer_with_no_hooks_returns_seed() {
        let p = pipeline(|_| {});
        let out = p
            .apply("renderer", ApplyKind::Reducer, json!("/default"), None)
            .await
            .unwrap();
        assert_eq!(out, json!("/default"));
    }

    #[tokio::test]
    async fn reducer_absent_return_keeps_accumulator() {
        let p = pipeline(|r| {
            r.register("renderer", Stage::Default, |_, _| async { Ok(None) });
        });
        let out = p
            .apply("renderer", ApplyKind::Reducer, json!("/default"), None)
            .await
            .unwrap();
        assert_eq!(out, json!("/default"));
    }

    #[tokio::test]
    async fn reducer_last_non_absent_return_wins() {
        let p = pipeline(|r| {
            r.register("renderer", Stage::Default, |_, _| async {
                Ok(Some(json!("/first")))
            });
            r.register("renderer", Stage::Default, |acc, _| async move {
                assert_eq!(acc, json!("/first"));
                Ok(Some(json!("/second")))
            });
            r.register("renderer", Stage::Default, |_, _| async { Ok(None) });
        });
        let out = p
            .apply("renderer", ApplyKind::Reducer, json!("/default"), None)
            .await
            .unwrap();
        assert_eq!(out, json!("/second"));
    }

    #[tokio::test]
    async fn failing_hook_short_circuits() {
        let p = pipeline(|r| {
            r.register("k", Stage::Default, |_, _| async {
                Ok(Some(json!(["ok"])))
            });
            r.register("k", Stage::Default, |_, _| async {
                Err("extension exploded".into())
            });
            r.register("k", Stage::Default, |_, _| async {
                panic!("must not run after a failure");
            });
        });

        let err = p
            .apply("k", ApplyKind::Collector, json!([]), None)
            .await
            .unwrap_err();
        assert!(matches!(err, HookError::HookFailed { order: 1, .. }));
    }

    #[tokio::test]
    async fn fire_runs_finalize_after_all_default() {
        use std::sync::Mutex;

        let log = Arc::new(Mutex::new(Vec::new()));
        let p = pipeline(|r| {
            for (stage, tag) in [
                (Stage::Finalize, "finalize"),
                (Stage::Default, "default-1"),
                (Stage::Default, "default-2"),
            ] {
                let log = Arc::clone(&log);
                r.register("onGenerateFiles", stage, move |_, _| {
                    let log = Arc::clone(&log);
                    async move {
                        log.lock().unwrap().push(tag);
                        Ok(None)
                    }
                });
            }
        });

        p.fire("onGenerateFiles", None).await.unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec!["default-1", "default-2", "finalize"]
        );
    }
}
