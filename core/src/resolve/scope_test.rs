#[cfg(test)]
mod tests {
    use crate::ast::{Location, Node, SelectorNode, UseNode, ValueNode, VariableNode};
    use crate::cache::{Document, FileCache, MemoryLoader};
    use crate::resolve::*;
    use crate::settings::FileSettings;

    fn binding(name: &str, line: usize) -> Binding {
        Binding { name: name.into(), line }
    }

    fn frame(line: usize, params: &[&str]) -> ScopeFrame {
        ScopeFrame {
            index: 0,
            line,
            params: params.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn distance_counts_tabs_as_tab_size() {
        assert_eq!(distance("\t\tfoo", 2), 4);
        assert_eq!(distance("  \tfoo", 4), 6);
        assert_eq!(distance("foo", 2), 0);
        assert_eq!(distance("   ", 2), 3);
    }

    #[test]
    fn level_rounds_half_up() {
        assert_eq!(level(0, 2), 0);
        assert_eq!(level(1, 2), 1);
        assert_eq!(level(4, 2), 2);
        assert_eq!(level(5, 4), 1);
        assert_eq!(level(6, 4), 2);
        assert_eq!(level(3, 0), 3);
    }

    #[test]
    fn placement_clamps_levels() {
        let mut scope = Scope::default();
        // nothing open: everything is top level
        assert_eq!(scope.place(4, 2, 2, Attach::Nested), Placement { level: 0, over_indented: false });
        assert_eq!(scope.place(4, 2, 2, Attach::Leaf), Placement { level: 0, over_indented: false });

        scope.open(frame(0, &[]));
        assert_eq!(scope.place(2, 1, 2, Attach::Nested), Placement { level: 1, over_indented: false });
        assert_eq!(scope.place(1, 1, 2, Attach::Nested), Placement { level: 0, over_indented: false });
        assert_eq!(scope.place(0, 0, 2, Attach::Leaf), Placement { level: 1, over_indented: false });
        assert_eq!(scope.place(6, 3, 2, Attach::Leaf), Placement { level: 1, over_indented: true });
        assert_eq!(scope.place(6, 3, 2, Attach::Nested), Placement { level: 1, over_indented: true });
    }

    #[test]
    fn limit_scope_drops_closed_bindings() {
        let mut scope = Scope::default();
        scope.declare_variable(0, binding("$top", 0));
        scope.open(frame(1, &[]));
        scope.declare_variable(1, binding("$inner", 2));
        scope.open(frame(3, &[]));
        scope.declare_variable(2, binding("$deep", 4));

        scope.limit_scope(1);
        assert_eq!(scope.depth(), 1);
        assert_eq!(scope.variables, vec![vec![binding("$top", 0)], vec![binding("$inner", 2)]]);

        scope.limit_scope(0);
        assert_eq!(scope.variables, vec![vec![binding("$top", 0)]]);
    }

    #[test]
    fn resolver_prefers_params_then_nearest_binding() {
        let cache = FileCache::new(MemoryLoader::new());
        let mut scope = Scope::default();
        scope.declare_variable(0, binding("$var", 0));
        scope.declare_variable(0, binding("$a", 1));
        scope.open(frame(2, &["$a"]));
        scope.declare_variable(1, binding("$var", 3));

        let resolver = Resolver::new("/file", &scope, &cache);
        assert_eq!(resolver.resolve("$var", None), Some(Location::new("/file", 3)));
        assert_eq!(resolver.resolve("$a", None), Some(Location::new("/file", 2)));
        assert_eq!(resolver.resolve("$var", Some("ns")), None);
        assert_eq!(resolver.resolve("$missing", None), None);
    }

    #[test]
    fn resolver_matches_use_namespaces() {
        let mut loader = MemoryLoader::new();
        loader.insert("/a.sass", "$x: 1px");
        let mut cache = FileCache::new(loader);
        cache.parse(&Document::new("/a.sass", "$x: 1px"), &FileSettings::default());

        let mut scope = Scope::default();
        scope.declare_import(
            0,
            ImportBinding {
                uri: "/a.sass".into(),
                kind: ImportKind::Use { namespace: Some("ns".into()) },
            },
        );
        let resolver = Resolver::new("/file", &scope, &cache);
        assert_eq!(resolver.resolve("$x", Some("ns")), Some(Location::new("/a.sass", 0)));
        assert_eq!(resolver.resolve("$x", None), None);

        scope.imports[0][0].kind = ImportKind::Use { namespace: None };
        let resolver = Resolver::new("/file", &scope, &cache);
        assert_eq!(resolver.resolve("$x", None), Some(Location::new("/a.sass", 0)));

        scope.imports[0][0].kind = ImportKind::Import;
        let resolver = Resolver::new("/file", &scope, &cache);
        assert_eq!(resolver.resolve("$x", None), Some(Location::new("/a.sass", 0)));
        assert_eq!(resolver.resolve("$x", Some("a")), None);
    }

    #[test]
    fn restore_follows_last_open_chain() {
        let nodes = vec![
            Node::Use(UseNode {
                line: 0,
                path: "a".into(),
                uri: "/a.sass".into(),
                namespace: Some("a".into()),
                with: None,
            }),
            Node::Variable(VariableNode {
                line: 1,
                level: 0,
                name: "$top".into(),
                value: vec![],
            }),
            Node::Selector(SelectorNode {
                line: 2,
                level: 0,
                value: vec![ValueNode::literal(".closed")],
                body: vec![Node::Variable(VariableNode {
                    line: 3,
                    level: 1,
                    name: "$gone".into(),
                    value: vec![],
                })],
            }),
            Node::Selector(SelectorNode {
                line: 4,
                level: 0,
                value: vec![ValueNode::literal(".open")],
                body: vec![Node::Variable(VariableNode {
                    line: 5,
                    level: 1,
                    name: "$kept".into(),
                    value: vec![],
                })],
            }),
        ];
        let scope = Scope::restore(&nodes, &|_| Vec::new());
        assert_eq!(scope.depth(), 1);
        assert_eq!(scope.frames[0].index, 3);
        assert_eq!(scope.frames[0].line, 4);
        assert_eq!(scope.variables, vec![vec![binding("$top", 1)], vec![binding("$kept", 5)]]);
        assert_eq!(scope.imports[0].len(), 1);
    }
}
