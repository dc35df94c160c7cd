//! End-to-end adapter behavior: wrapping, substitution, context
//! passthrough, error propagation, nesting, and the declarative
//! construction form.

use anyhow::Result;
use keyscope::{
    component_fn, scoped, scoped_from_config, Component, ComponentRegistry, KeyStore,
    MatchOptions, Namespace, ScopeError, ScopedConfig, WriteOp,
};
use serde_json::{json, Value};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn site() -> Namespace<Value> {
    [
        (
            "contents/posts/post-0.md",
            json!({ "contents": "*hello world*" }),
        ),
        (
            "contents/posts/post-1.html",
            json!({ "contents": "<em>hello world</em>" }),
        ),
        ("index.md", json!({ "contents": "# A Sample Website" })),
        ("contents/top-level.html", json!({ "contents": "Not a post" })),
    ]
    .into_iter()
    .collect()
}

/// Stand-in for the orchestrator state a pipeline threads through its
/// components.
#[derive(Debug, PartialEq)]
struct PipelineCtx {
    source_dir: String,
    invocations: u32,
}

#[test]
fn test_wrapped_component_runs_once_with_context_forwarded() {
    init_tracing();
    let mut ns = site();
    let mut ctx = PipelineCtx {
        source_dir: "src".to_string(),
        invocations: 0,
    };

    let probe = component_fn(
        "probe",
        |_: &mut dyn KeyStore<Value>, ctx: &mut PipelineCtx| -> Result<()> {
            assert_eq!(ctx.source_dir, "src");
            ctx.invocations += 1;
            Ok(())
        },
    );
    scoped(probe, Vec::<String>::new(), MatchOptions::default())
        .expect("wrap")
        .run(&mut ns, &mut ctx)
        .expect("run");

    assert_eq!(ctx.invocations, 1);
    assert_eq!(ctx.source_dir, "src");
}

#[test]
fn test_empty_patterns_show_component_an_empty_store() {
    let mut ns = site();
    let mut seen: Vec<String> = Vec::new();

    let probe = component_fn(
        "probe",
        |files: &mut dyn KeyStore<Value>, seen: &mut Vec<String>| -> Result<()> {
            seen.extend(files.keys());
            assert!(files.get("index.md").is_none());
            assert!(!files.contains("contents/top-level.html"));
            Ok(())
        },
    );
    scoped(probe, Vec::<String>::new(), MatchOptions::default())
        .expect("wrap")
        .run(&mut ns, &mut seen)
        .expect("run");

    assert!(seen.is_empty());
    assert_eq!(ns.len(), 4, "the namespace itself is untouched");
}

#[test]
fn test_html_patterns_show_exactly_the_html_files() {
    let mut ns = site();
    let mut seen: Vec<String> = Vec::new();

    let probe = component_fn(
        "probe",
        |files: &mut dyn KeyStore<Value>, seen: &mut Vec<String>| -> Result<()> {
            seen.extend(files.keys());
            assert_eq!(
                files.get("contents/posts/post-1.html"),
                Some(&json!({ "contents": "<em>hello world</em>" }))
            );
            assert!(files.get("index.md").is_none());
            assert!(!files.contains("contents/posts/post-0.md"));
            Ok(())
        },
    );
    scoped(probe, ["**/*.html"], MatchOptions::default())
        .expect("wrap")
        .run(&mut ns, &mut seen)
        .expect("run");

    assert_eq!(
        seen,
        vec!["contents/posts/post-1.html", "contents/top-level.html"]
    );
}

#[test]
fn test_component_writes_flow_through_to_the_namespace() {
    let mut ns = site();
    let mut ctx = ();

    let render = component_fn(
        "render",
        |files: &mut dyn KeyStore<Value>, _: &mut ()| -> Result<()> {
            for key in files.keys() {
                if !key.ends_with(".md") {
                    continue;
                }
                let rendered = key.replace(".md", ".html");
                let body = files.remove(&key)?.unwrap_or_else(|| json!({}));
                files.set(&rendered, body)?;
            }
            Ok(())
        },
    );
    scoped(render, ["contents/posts/*"], MatchOptions::default())
        .expect("wrap")
        .run(&mut ns, &mut ctx)
        .expect("run");

    assert!(!ns.contains("contents/posts/post-0.md"));
    assert_eq!(
        ns.get("contents/posts/post-0.html"),
        Some(&json!({ "contents": "*hello world*" }))
    );
    assert!(ns.contains("index.md"), "out-of-scope keys untouched");
}

#[test]
fn test_out_of_scope_write_surfaces_as_scope_error() {
    let mut ns = site();
    let mut ctx = ();

    let vandal = component_fn(
        "vandal",
        |files: &mut dyn KeyStore<Value>, _: &mut ()| -> Result<()> {
            files.set("index.md", json!({ "contents": "clobbered" }))?;
            Ok(())
        },
    );
    let err = scoped(vandal, ["contents/**"], MatchOptions::default())
        .expect("wrap")
        .run(&mut ns, &mut ctx)
        .unwrap_err();

    match err.downcast_ref::<ScopeError>() {
        Some(ScopeError::OutOfScopeWrite {
            component,
            op,
            key,
            patterns,
        }) => {
            assert_eq!(component, "vandal");
            assert_eq!(*op, WriteOp::Set);
            assert_eq!(key, "index.md");
            assert_eq!(patterns, &["contents/**"]);
        }
        other => panic!("expected OutOfScopeWrite, got {other:?}"),
    }
    assert_eq!(
        ns.get("index.md"),
        Some(&json!({ "contents": "# A Sample Website" })),
        "rejected write must not mutate the namespace"
    );
}

#[test]
fn test_component_error_propagates_verbatim() {
    let mut ns = site();
    let mut ctx = ();

    let failing = component_fn(
        "failing",
        |_: &mut dyn KeyStore<Value>, _: &mut ()| -> Result<()> {
            Err(anyhow::anyhow!("upstream fetch timed out"))
        },
    );
    let err = scoped(failing, ["**"], MatchOptions::default())
        .expect("wrap")
        .run(&mut ns, &mut ctx)
        .unwrap_err();

    assert_eq!(err.to_string(), "upstream fetch timed out");
}

#[test]
fn test_nested_scopes_intersect() {
    let mut ns = site();
    let mut seen: Vec<String> = Vec::new();

    let probe = component_fn(
        "probe",
        |files: &mut dyn KeyStore<Value>, seen: &mut Vec<String>| -> Result<()> {
            seen.extend(files.keys());
            Ok(())
        },
    );
    let inner = scoped(probe, ["contents/**"], MatchOptions::default()).expect("inner");
    let outer = scoped(inner, ["**/*.html"], MatchOptions::default()).expect("outer");
    outer.run(&mut ns, &mut seen).expect("run");

    assert_eq!(
        seen,
        vec!["contents/posts/post-1.html", "contents/top-level.html"]
    );
}

#[test]
fn test_config_form_resolves_and_scopes() {
    let mut registry: ComponentRegistry<Value, ()> = ComponentRegistry::new();
    registry.register("uppercase", |args| {
        let field = args
            .get("field")
            .and_then(Value::as_str)
            .unwrap_or("contents")
            .to_string();
        Ok(Box::new(component_fn(
            "uppercase",
            move |files: &mut dyn KeyStore<Value>, _: &mut ()| -> Result<()> {
                for key in files.keys() {
                    if let Some(body) = files.get_mut(&key) {
                        if let Some(text) = body.get(&field).and_then(Value::as_str) {
                            let upper = text.to_uppercase();
                            body[&field] = json!(upper);
                        }
                    }
                }
                Ok(())
            },
        )))
    });

    let config: ScopedConfig = serde_json::from_value(json!({
        "component": { "uppercase": { "field": "contents" } },
        "patterns": ["**/*.md"],
        "options": { "dot": false }
    }))
    .expect("config");

    let component = scoped_from_config(&config, &registry).expect("build");
    let mut ns = site();
    let mut ctx = ();
    component.run(&mut ns, &mut ctx).expect("run");

    assert_eq!(
        ns.get("index.md"),
        Some(&json!({ "contents": "# A SAMPLE WEBSITE" }))
    );
    assert_eq!(
        ns.get("contents/top-level.html"),
        Some(&json!({ "contents": "Not a post" })),
        "html files were out of scope"
    );
}

#[test]
fn test_unscoped_and_scoped_components_are_interchangeable() {
    // The pipeline's view of a stage is just `Component`; wrapping does not
    // change the interface.
    fn run_stage<P: Component<Value, ()>>(stage: &P, ns: &mut Namespace<Value>) -> Result<()> {
        let mut ctx = ();
        stage.run(ns, &mut ctx)
    }

    let stamp = component_fn(
        "stamp",
        |files: &mut dyn KeyStore<Value>, _: &mut ()| -> Result<()> {
            files.set("build.log", json!({ "contents": "ok" }))?;
            Ok(())
        },
    );

    let mut ns = site();
    run_stage(&stamp, &mut ns).expect("bare component");
    assert!(ns.contains("build.log"));

    let mut ns = site();
    let wrapped = scoped(stamp, ["build.log"], MatchOptions::default()).expect("wrap");
    run_stage(&wrapped, &mut ns).expect("scoped component");
    assert!(ns.contains("build.log"));
}
