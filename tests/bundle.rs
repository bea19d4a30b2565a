mod common;

use common::{TestSystem, composer_with, create_dir, temp_dir};
use composable_app::EngineError;
use composable_app::autoload::{Directive, Root, TOP_LEVEL};

#[test]
fn test_bundle_maps_systems_in_declaration_order_then_app() {
    let dir = temp_dir();
    let auth_root = create_dir(dir.path(), "lib/auth_system");
    let web_root = create_dir(dir.path(), "lib/web_system");
    let project = create_dir(dir.path(), "proj");
    let app_dir = create_dir(&project, "app");

    let mut composer = composer_with(vec![
        ("web", TestSystem::rooted(&web_root)),
        ("auth", TestSystem::rooted(&auth_root)),
    ]);
    composer.declare("auth").declare("web");
    assert!(!composer.is_locked());

    let registry = composer.bundle(&project, "app").unwrap();

    assert_eq!(
        registry.mapping().roots(),
        &[
            Root {
                path: auth_root.clone(),
                namespace: "AuthSystem".to_string(),
            },
            Root {
                path: web_root.clone(),
                namespace: "WebSystem".to_string(),
            },
            Root {
                path: app_dir.clone(),
                namespace: TOP_LEVEL.to_string(),
            },
        ]
    );
    assert_eq!(registry.keys().collect::<Vec<_>>(), vec!["auth", "web"]);
    assert!(registry.is_locked());
    assert!(matches!(
        registry.declare("late"),
        Err(EngineError::LockedRegistration { key }) if key == "late"
    ));
}

#[test]
fn test_bundle_skips_missing_app_dir() {
    let dir = temp_dir();
    let auth_root = create_dir(dir.path(), "lib/auth_system");

    let mut composer = composer_with(vec![("auth", TestSystem::rooted(&auth_root))]);
    composer.declare("auth");
    let registry = composer.bundle(dir.path(), "app").unwrap();

    let roots = registry.mapping().roots();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].path, auth_root);
    assert_eq!(registry.app_dir(), dir.path().join("app"));
}

#[test]
fn test_bundle_applies_collapse_before_push() {
    let dir = temp_dir();
    let auth_root = create_dir(dir.path(), "auth_system");
    create_dir(dir.path(), "app");

    let mut composer = composer_with(vec![("auth", TestSystem::rooted(&auth_root))]);
    composer.declare("auth");
    let registry = composer.bundle(dir.path(), "app").unwrap();

    let directives = registry.mapping().directives();
    assert_eq!(directives.len(), 4);
    assert!(matches!(directives[0], Directive::Collapse(_)));
    assert!(matches!(directives[1], Directive::Collapse(_)));
    assert!(matches!(directives[2], Directive::Push(_)));
    assert!(matches!(directives[3], Directive::Push(_)));
}

#[test]
fn test_declare_after_bundle_fails_regardless_of_count() {
    let dir = temp_dir();
    let systems: Vec<_> = ["a", "b", "c"]
        .into_iter()
        .map(|key| (key, TestSystem::rooted(dir.path().join(key))))
        .collect();

    for count in 0..=3 {
        let mut composer = composer_with(systems.clone());
        for (key, _) in systems.iter().take(count) {
            composer.declare(*key);
        }
        let registry = composer.bundle(dir.path(), "app").unwrap();
        assert_eq!(registry.systems().count(), count);
        assert!(matches!(
            registry.declare("d"),
            Err(EngineError::LockedRegistration { .. })
        ));
    }
}

#[test]
fn test_declaring_twice_keeps_first_position() {
    let dir = temp_dir();
    let mut composer = composer_with(vec![
        ("a", TestSystem::rooted(dir.path().join("a"))),
        ("b", TestSystem::rooted(dir.path().join("b"))),
    ]);
    composer.declare("a").declare("b").declare("a");
    assert_eq!(composer.declared().collect::<Vec<_>>(), vec!["a", "b"]);
}

#[test]
fn test_bundle_binds_implementations() {
    let dir = temp_dir();
    let auth_root = create_dir(dir.path(), "auth_system");
    let mut composer = composer_with(vec![("auth", TestSystem::rooted(&auth_root))]);
    composer.declare("auth");
    let registry = composer.bundle(dir.path(), "app").unwrap();

    let implementation = registry.get("auth").unwrap();
    assert_eq!(implementation.source_root(), auth_root);
    let resolved = registry.system("auth").unwrap();
    assert_eq!(resolved.type_name, "AuthSystem");
    assert!(registry.get("web").is_none());
}
