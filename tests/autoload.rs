mod common;

use common::{create_dir, temp_dir, touch};
use composable_app::EngineError;
use composable_app::autoload::{Directive, MappingBuilder, TOP_LEVEL};
use composable_app::composer::collapse_all;
use composable_app::loaders::Loaders;

#[test]
fn test_names_follow_directories_without_collapse() {
    let dir = temp_dir();
    let root = create_dir(dir.path(), "dev_system");
    touch(&root, "dev_box.rs");
    touch(&root, "commands/new_command.rs");
    touch(&root, "commands/README.md");

    let loaders = Loaders::new();
    let mut builder = MappingBuilder::new("test");
    builder.push(&root, "DevSystem");
    let mapping = builder.activate(&loaders).unwrap();

    assert_eq!(
        mapping.names().unwrap(),
        vec!["DevSystem::Commands::NewCommand", "DevSystem::DevBox"]
    );
}

#[test]
fn test_collapse_drops_directory_segments() {
    let dir = temp_dir();
    let root = create_dir(dir.path(), "dev_system");
    touch(&root, "commands/generators/new_generator.rs");

    let loaders = Loaders::new();
    let mut builder = MappingBuilder::new("test");
    builder.collapse(collapse_all(&root)).push(&root, "DevSystem");
    let mapping = builder.activate(&loaders).unwrap();

    let expected = root.join("commands/generators/new_generator.rs");
    assert_eq!(
        mapping.lookup("DevSystem::NewGenerator").unwrap(),
        Some(expected)
    );
    assert_eq!(mapping.lookup("DevSystem::Commands::Generators::NewGenerator").unwrap(), None);
}

#[test]
fn test_ignore_excludes_paths() {
    let dir = temp_dir();
    let root = create_dir(dir.path(), "app");
    touch(&root, "models/user.rs");
    touch(&root, "tmp/scratch.rs");

    let loaders = Loaders::new();
    let mut builder = MappingBuilder::new("test");
    builder.push(&root, TOP_LEVEL);
    builder.ignore(format!("{}/tmp", root.display()));
    let mapping = builder.activate(&loaders).unwrap();

    assert_eq!(mapping.names().unwrap(), vec!["Models::User"]);
    assert!(matches!(
        mapping.directives().first(),
        Some(Directive::Ignore(_))
    ));
}

#[test]
fn test_push_missing_directory_is_noop() {
    let dir = temp_dir();
    let loaders = Loaders::new();
    let mut builder = MappingBuilder::new("test");
    builder.push(dir.path().join("absent"), "Nope");
    assert!(builder.directives().is_empty());

    let mapping = builder.activate(&loaders).unwrap();
    assert!(mapping.roots().is_empty());
    assert!(mapping.names().unwrap().is_empty());
}

#[test]
fn test_invalid_pattern_fails_activation() {
    let loaders = Loaders::new();
    let mut builder = MappingBuilder::new("test");
    builder.collapse("[unclosed");
    let err = builder.activate(&loaders).unwrap_err();
    assert!(matches!(err, EngineError::Pattern { pattern, .. } if pattern == "[unclosed"));
    assert!(loaders.mappings().is_empty());
}

#[test]
fn test_first_root_wins_on_duplicate_names() {
    let dir = temp_dir();
    let first = create_dir(dir.path(), "first");
    let second = create_dir(dir.path(), "second");
    touch(&first, "shared.rs");
    touch(&second, "shared.rs");

    let loaders = Loaders::new();
    let mut builder = MappingBuilder::new("test");
    builder.push(&first, TOP_LEVEL).push(&second, TOP_LEVEL);
    let mapping = builder.activate(&loaders).unwrap();

    assert_eq!(
        mapping.lookup("Shared").unwrap(),
        Some(first.join("shared.rs"))
    );
}

#[test]
fn test_index_is_lazy_and_reloadable() {
    let dir = temp_dir();
    let root = create_dir(dir.path(), "app");
    touch(&root, "first.rs");

    let loaders = Loaders::new();
    let mut builder = MappingBuilder::new("test");
    builder.push(&root, TOP_LEVEL);
    let mapping = builder.activate(&loaders).unwrap();
    assert!(!mapping.is_loaded());

    assert!(mapping.lookup("First").unwrap().is_some());
    assert!(mapping.is_loaded());

    touch(&root, "second.rs");
    assert_eq!(mapping.lookup("Second").unwrap(), None);

    loaders.reload().unwrap();
    assert!(!mapping.is_loaded());
    assert_eq!(mapping.generation(), 1);
    assert_eq!(
        mapping.lookup("Second").unwrap(),
        Some(root.join("second.rs"))
    );
    assert_eq!(mapping.roots().len(), 1);
}

#[test]
fn test_custom_extension() {
    let dir = temp_dir();
    let root = create_dir(dir.path(), "app");
    touch(&root, "widget.rb");
    touch(&root, "gadget.rs");

    let loaders = Loaders::new();
    let mut builder = MappingBuilder::new("test");
    builder.extension("rb").push(&root, "App");
    let mapping = builder.activate(&loaders).unwrap();

    assert_eq!(mapping.names().unwrap(), vec!["App::Widget"]);
}

#[test]
fn test_eager_load_all_indexes_every_mapping() {
    let dir = temp_dir();
    let a = create_dir(dir.path(), "a");
    let b = create_dir(dir.path(), "b");
    touch(&a, "one.rs");
    touch(&b, "two.rs");
    touch(&b, "three.rs");

    let loaders = Loaders::new();
    let mut first = MappingBuilder::new("a");
    first.push(&a, "A");
    let first = first.activate(&loaders).unwrap();
    let mut second = MappingBuilder::new("b");
    second.push(&b, "B");
    let second = second.activate(&loaders).unwrap();

    assert_eq!(loaders.mappings().len(), 2);
    assert_eq!(loaders.eager_load_all().unwrap(), 3);
    assert!(first.is_loaded());
    assert!(second.is_loaded());
}
