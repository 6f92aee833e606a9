#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::cache::{Document, FileCache, MemoryLoader, PartialDocument};
    use crate::diagnostics::{DiagnosticCode, Range};
    use crate::settings::FileSettings;

    fn parse_with(loader: MemoryLoader, uri: &str, text: &str) -> (FileCache, SassFile) {
        let mut cache = FileCache::new(loader);
        cache.parse(&Document::new(uri, text), &FileSettings::default());
        let file = cache.file(uri).unwrap().clone();
        (cache, file)
    }

    fn parse(text: &str) -> SassFile {
        parse_with(MemoryLoader::new(), "/main.sass", text).1
    }

    fn codes(file: &SassFile) -> Vec<DiagnosticCode> {
        file.diagnostics.iter().map(|d| d.code).collect()
    }

    fn reference(file: &SassFile, line: usize) -> Option<Location> {
        let node = find_node(&file.body, line).unwrap();
        node.variable_refs().first().and_then(|r| r.reference.clone())
    }

    #[test]
    fn selector_with_property() {
        let file = parse(".class\n  margin: 20px");
        assert_eq!(
            file.body,
            vec![Node::Selector(SelectorNode {
                line: 0,
                level: 0,
                value: vec![ValueNode::literal(".class")],
                body: vec![Node::Property(PropertyNode {
                    line: 1,
                    level: 1,
                    name: vec![ValueNode::literal("margin")],
                    value: vec![ValueNode::literal("20px")],
                })],
            })]
        );
        assert!(file.diagnostics.is_empty());
    }

    #[test]
    fn nearest_declaration_wins() {
        let file = parse("$var:1px\n.class\n  $var:2px\n  left:$var");
        assert_eq!(reference(&file, 3), Some(Location::new("/main.sass", 2)));
        assert!(file.diagnostics.is_empty());
    }

    #[test]
    fn closed_scope_bindings_are_not_visible() {
        let file = parse(".a\n  $inner: 1px\n.b\n  width: $inner");
        assert_eq!(reference(&file, 3), None);
        assert_eq!(codes(&file), vec![DiagnosticCode::VariableNotFound]);
        assert_eq!(file.diagnostics[0].range, Range::on_line(3, 9, 15));
        assert_eq!(file.diagnostics[0].message, "Variable declaration for $inner not found.");
    }

    #[test]
    fn variable_value_sees_earlier_declaration() {
        let file = parse("$a: 1px\n$a: $a + 1");
        assert_eq!(reference(&file, 1), Some(Location::new("/main.sass", 0)));
    }

    #[test]
    fn use_namespaces() {
        let loader = MemoryLoader::new().with_file("/a.sass", "$x: 1px");
        let (_, file) = parse_with(loader.clone(), "/main.sass", "@use './a' as ns\n.c\n  prop: ns.$x\n  other: $x");
        assert_eq!(reference(&file, 2), Some(Location::new("/a.sass", 0)));
        assert_eq!(reference(&file, 3), None);

        let (_, file) = parse_with(loader, "/main.sass", "@use './a' as *\n.c\n  prop: $x");
        assert_eq!(reference(&file, 2), Some(Location::new("/a.sass", 0)));
        assert!(file.diagnostics.is_empty());
    }

    #[test]
    fn use_default_namespace_is_last_segment() {
        let loader = MemoryLoader::new().with_file("/lib/_colors.sass", "$red: #f00");
        let (_, file) = parse_with(loader, "/main.sass", "@use 'lib/colors'\n.c\n  color: colors.$red");
        assert_eq!(reference(&file, 2), Some(Location::new("/lib/_colors.sass", 0)));
        let Node::Use(using) = &file.body[0] else { panic!("expected use") };
        assert_eq!(using.namespace.as_deref(), Some("colors"));
        assert_eq!(using.uri, "/lib/_colors.sass");
    }

    #[test]
    fn imports_are_scoped_to_their_level() {
        let loader = MemoryLoader::new().with_file("/b.sass", "$y: 2px");
        let (cache, file) = parse_with(loader, "/main.sass", ".a\n  @import 'b'\n  top: $y\n.c\n  top: $y");
        assert_eq!(reference(&file, 2), Some(Location::new("/b.sass", 0)));
        assert_eq!(reference(&file, 4), None);
        assert!(cache.file("/b.sass").is_some());
    }

    #[test]
    fn over_indented_property_attaches_to_deepest_scope() {
        let file = parse(".a\n  .b\n        color: red");
        let Node::Selector(a) = &file.body[0] else { panic!("expected selector") };
        let Node::Selector(b) = &a.body[0] else { panic!("expected selector") };
        assert_eq!(b.body[0].level(), Some(2));
        assert_eq!(codes(&file), vec![DiagnosticCode::InvalidIndentation]);
        assert_eq!(file.diagnostics[0].message, "Invalid Indentation Expected 4 tabs");
        assert_eq!(file.diagnostics[0].range, Range::on_line(2, 8, 18));
        assert!(file.diagnostics[0].is_resolved_by_stringify);
    }

    #[test]
    fn use_after_rule_becomes_comment() {
        let file = parse(".a\n  color: red\n@use 'x'");
        assert_eq!(
            file.body[1],
            Node::Comment(CommentNode {
                line: 2,
                level: 0,
                value: "// @use 'x'".into(),
            })
        );
        assert_eq!(codes(&file), vec![DiagnosticCode::UseNotTopLevel]);
    }

    #[test]
    fn use_allowed_after_variables_comments_and_forward() {
        let loader = MemoryLoader::new().with_file("/x.sass", "");
        let (_, file) = parse_with(loader, "/main.sass", "// header\n$a: 1\n@forward 'y'\n\n@use 'x'");
        assert!(matches!(file.body[4], Node::Use(_)));
        assert!(file.diagnostics.is_empty());
    }

    #[test]
    fn shallower_line_closes_scopes_in_order() {
        let file = parse(".a\n  .b\n    color: red\n  width: 1px\n.c");
        let Node::Selector(a) = &file.body[0] else { panic!("expected selector") };
        assert_eq!(a.body.len(), 2);
        assert_eq!(a.body[1].line(), 3);
        assert_eq!(file.body[1].line(), 4);
    }

    #[test]
    fn unindented_property_joins_open_scope() {
        let file = parse(".a\ncolor: red");
        let Node::Selector(a) = &file.body[0] else { panic!("expected selector") };
        assert_eq!(a.body[0].level(), Some(1));
        assert!(file.diagnostics.is_empty());
    }

    #[test]
    fn mixin_args_and_defaults() {
        let file = parse("@mixin name ( $a, $b: 'x, y', $c: $a)\n  width: $b\n.a\n  +name(1)");
        let Node::Mixin(mixin) = &file.body[0] else { panic!("expected mixin") };
        assert_eq!(mixin.mixin_type, MixinType::At);
        assert_eq!(mixin.name, "name");
        let names: Vec<&str> = mixin.args.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["$a", "$b", "$c"]);
        assert_eq!(mixin.args[0].default, None);
        assert_eq!(mixin.args[1].default, Some(vec![ValueNode::literal("'x, y'")]));
        assert_eq!(
            mixin.args[2].default,
            Some(vec![ValueNode::variable_ref("$a", Some(Location::new("/main.sass", 0)))])
        );
        assert_eq!(reference(&file, 1), Some(Location::new("/main.sass", 0)));
        assert!(file.diagnostics.is_empty());

        let Node::Selector(a) = &file.body[1] else { panic!("expected selector") };
        let Node::Include(include) = &a.body[0] else { panic!("expected include") };
        assert_eq!(include.include_type, IncludeType::Plus);
    }

    #[test]
    fn mixin_default_reports_missing_variable() {
        let file = parse("=mx($arg1: $nonExistentVar)");
        let Node::Mixin(mixin) = &file.body[0] else { panic!("expected mixin") };
        assert_eq!(mixin.mixin_type, MixinType::Equals);
        assert_eq!(codes(&file), vec![DiagnosticCode::VariableNotFound]);
        assert_eq!(file.diagnostics[0].range, Range::on_line(0, 11, 26));
    }

    #[test]
    fn loop_and_function_params_resolve_to_head() {
        let file = parse("@each $key, $value in (a: 1)\n  .#{$key}\n    width: $value\n@function double($n)\n  @return $n * 2");
        assert_eq!(reference(&file, 1), Some(Location::new("/main.sass", 0)));
        assert_eq!(reference(&file, 2), Some(Location::new("/main.sass", 0)));
        assert!(file.diagnostics.is_empty());
        let Node::Selector(function) = &file.body[1] else { panic!("expected directive") };
        assert!(matches!(function.body[0], Node::Literal(_)));
    }

    #[test]
    fn block_comments_collect_lines() {
        let file = parse("/**\n  * Comment\n\n */\n.a");
        let Node::BlockComment(comment) = &file.body[0] else { panic!("expected block comment") };
        let values: Vec<&str> = comment.body.iter().map(|l| l.value.as_str()).collect();
        assert_eq!(values, vec!["/**", " * Comment", "", " */"]);
        assert_eq!(comment.line, 0);
        assert_eq!(file.body[1].line(), 4);
    }

    #[test]
    fn extend_include_and_literals() {
        let file = parse("%p\n  color: red\n.a\n  @extend %p\n  @include name($color: red)\n@charset 'utf-8'");
        let Node::Selector(a) = &file.body[1] else { panic!("expected selector") };
        assert_eq!(
            a.body[0],
            Node::Extend(ExtendNode {
                line: 3,
                level: 1,
                value: "%p".into(),
            })
        );
        assert!(matches!(a.body[1], Node::Include(_)));
        assert!(matches!(file.body[2], Node::Literal(_)));
        assert!(file.diagnostics.is_empty());
    }

    #[test]
    fn missing_import_is_reported() {
        let file = parse("@import 'nope'");
        assert_eq!(codes(&file), vec![DiagnosticCode::ImportNotFound]);
        let Node::Import(import) = &file.body[0] else { panic!("expected import") };
        assert_eq!(import.uri, "/nope.sass");
    }

    #[test]
    fn builtin_and_css_imports_are_not_loaded() {
        let file = parse("@use 'sass:math'\n@import 'reset.css'\n.a\n  width: math.$pi");
        assert!(file.diagnostics.is_empty());
        assert_eq!(reference(&file, 3), None);
    }

    #[test]
    fn builtin_namespace_members_are_not_reported() {
        let file = parse("@use 'sass:math' as m\n@use 'sass:color'\n.a\n  width: m.$pi color.$x\n  height: other.$e $e");
        let lines: Vec<usize> = file.diagnostics.iter().map(|d| d.range.start.line).collect();
        assert_eq!(lines, vec![4, 4]);
        assert_eq!(codes(&file), vec![DiagnosticCode::VariableNotFound; 2]);
    }

    #[test]
    fn import_cycle_terminates() {
        let loader = MemoryLoader::new()
            .with_file("/a.sass", "@import 'b'\n$a: 1")
            .with_file("/b.sass", "@import 'a'\n$b: $a");
        let (cache, file) = parse_with(loader, "/a.sass", "@import 'b'\n$a: 1");
        assert!(file.diagnostics.is_empty());
        let b = cache.file("/b.sass").unwrap();
        assert_eq!(
            b.diagnostics.iter().map(|d| d.code).collect::<Vec<_>>(),
            vec![DiagnosticCode::ImportCycle, DiagnosticCode::VariableNotFound]
        );
    }

    #[test]
    fn partial_parse_matches_full_parse() {
        let text = "$a: 1px\n.a\n  width: $a\n  .b\n    /* note\n     more */\n    height: $a\n\n@mixin m($x)\n  top: $x";
        let full = parse(text);
        for start in 0..=9 {
            let mut cache = FileCache::new(MemoryLoader::new());
            cache.parse(&Document::new("/main.sass", text), &FileSettings::default());
            let previous = cache.file("/main.sass").unwrap().body.clone();
            let tail: Vec<&str> = text.split('\n').skip(start).collect();
            cache.parse_partial(
                PartialDocument {
                    uri: "/main.sass".into(),
                    start_line: start,
                    end_line: 10,
                    text: tail.join("\n"),
                    previous_nodes: previous,
                },
                &FileSettings::default(),
            );
            assert_eq!(cache.file("/main.sass").unwrap(), &full, "start line {}", start);
        }
    }

    #[test]
    fn tab_indentation() {
        let file = parse(".a\n\t.b\n\t\tcolor: red");
        let Node::Selector(a) = &file.body[0] else { panic!("expected selector") };
        let Node::Selector(b) = &a.body[0] else { panic!("expected selector") };
        assert_eq!(b.body[0].level(), Some(2));
        assert!(file.diagnostics.is_empty());
    }
}
