#[cfg(test)]
mod tests {
    use crate::ast::Node;
    use crate::cache::{CacheEntry, Document, FileCache, MemoryLoader};
    use crate::settings::FileSettings;

    fn settings() -> FileSettings {
        FileSettings::default()
    }

    #[test]
    fn look_up_loads_through_loader_once() {
        let loader = MemoryLoader::new().with_file("/a.sass", "$x: 1px\n.a\n  $y: 2px");
        let mut cache = FileCache::new(loader);
        assert!(cache.look_up_file("/a.sass", &settings()));
        assert!(cache.look_up_file("/a.sass", &settings()));
        assert_eq!(cache.find_variable("/a.sass", "$x").map(|v| v.line), Some(0));
        // only top-level declarations are exported
        assert!(cache.find_variable("/a.sass", "$y").is_none());
    }

    #[test]
    fn missing_files_are_remembered_until_forgotten() {
        let mut cache = FileCache::new(MemoryLoader::new());
        assert!(!cache.look_up_file("/nope.sass", &settings()));
        assert_eq!(cache.entry("/nope.sass"), Some(&CacheEntry::NotFound));
        cache.forget_missing();
        assert_eq!(cache.entry("/nope.sass"), None);
    }

    #[test]
    fn parse_overwrites_and_evict_removes() {
        let mut cache = FileCache::new(MemoryLoader::new());
        cache.parse(&Document::new("/m.sass", ".a"), &settings());
        cache.parse(&Document::new("/m.sass", ".b\n  color: red"), &settings());
        assert!(matches!(cache.find_node("/m.sass", 1), Some(Node::Property(_))));
        assert!(cache.evict("/m.sass").is_some());
        assert!(cache.file("/m.sass").is_none());
    }

    #[test]
    fn stringify_unknown_file_fails() {
        let mut cache = FileCache::new(MemoryLoader::new());
        let err = cache.stringify_file("/nope.sass", &settings()).unwrap_err();
        assert!(err.to_string().contains("/nope.sass"));
    }

    #[test]
    fn find_node_returns_innermost() {
        let mut cache = FileCache::new(MemoryLoader::new());
        cache.parse(&Document::new("/m.sass", ".a\n  .b\n    color: red\n  width: 0"), &settings());
        assert!(matches!(cache.find_node("/m.sass", 2), Some(Node::Property(p)) if p.line == 2));
        assert!(matches!(cache.find_node("/m.sass", 1), Some(Node::Selector(s)) if s.line == 1));
        assert!(cache.find_node("/m.sass", 9).is_none());
    }
}
