use trawl_core::config::RetrievalConfig;
use trawl_core::dispatch::{Dispatcher, RetrievalRule, StrategyKind, UrlMatcher};
use trawl_core::{dispatch, SearchResult};
use url::Url;

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

#[test]
fn test_structured_rule_wins_over_static_list() {
    let dispatcher = Dispatcher::new(vec![
        RetrievalRule::static_site("example.com"),
        RetrievalRule::structured_domain("social.example"),
    ]);

    let result = SearchResult::parse("https://social.example/thread/1", "t", "s").unwrap();
    assert_eq!(dispatch(&dispatcher, &result), StrategyKind::StructuredApi);

    assert_eq!(
        dispatcher.dispatch_url(&url("https://example.com/docs/page")),
        StrategyKind::Static
    );
    assert_eq!(
        dispatcher.dispatch_url(&url("https://unknown.example.net/")),
        StrategyKind::Dynamic
    );
}

#[test]
fn test_domain_listed_in_both_routes_structured() {
    let mut config = RetrievalConfig::default();
    config.static_sites = vec!["reddit.com".to_string(), "docs.rs".to_string()];
    let dispatcher = Dispatcher::from_config(&config);

    assert_eq!(
        dispatcher.dispatch_url(&url("https://www.reddit.com/r/rust/comments/abc/t/")),
        StrategyKind::StructuredApi
    );
    assert_eq!(
        dispatcher.dispatch_url(&url("https://docs.rs/tokio/latest/tokio/")),
        StrategyKind::Static
    );
}

#[test]
fn test_dispatch_is_order_independent() {
    let dispatcher = Dispatcher::new(vec![
        RetrievalRule::static_site("example.com"),
        RetrievalRule::structured_prefix("https://forum.example.com/t/"),
    ]);
    let urls = [
        "https://forum.example.com/t/42",
        "https://example.com/",
        "https://spa.example.org/#/home",
        "https://forum.example.com/latest",
    ];

    let forward: Vec<StrategyKind> = urls.iter().map(|u| dispatcher.dispatch_url(&url(u))).collect();
    let backward: Vec<StrategyKind> = urls
        .iter()
        .rev()
        .map(|u| dispatcher.dispatch_url(&url(u)))
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    assert_eq!(forward, backward);
    assert_eq!(
        forward,
        vec![
            StrategyKind::StructuredApi,
            StrategyKind::Static,
            StrategyKind::Dynamic,
            StrategyKind::Static,
        ]
    );
}

#[test]
fn test_rule_order_by_priority_not_insertion() {
    let a = Dispatcher::new(vec![
        RetrievalRule::static_site("example.com"),
        RetrievalRule::structured_domain("example.com"),
    ]);
    let b = Dispatcher::new(vec![
        RetrievalRule::structured_domain("example.com"),
        RetrievalRule::static_site("example.com"),
    ]);
    let target = url("https://example.com/x");
    assert_eq!(a.dispatch_url(&target), b.dispatch_url(&target));
}

#[test]
fn test_explain_names_rule() {
    let dispatcher = Dispatcher::new(vec![RetrievalRule::static_site("example.com")]);
    let decision = dispatcher.explain(&url("https://blog.example.com/post"));
    assert_eq!(decision.strategy, StrategyKind::Static);
    assert_eq!(decision.rule.as_deref(), Some("static_site:example.com"));
}

#[test]
fn test_custom_rule() {
    let dispatcher = Dispatcher::new(vec![RetrievalRule {
        id: "docs".to_string(),
        matcher: UrlMatcher::Prefix("https://example.org/docs/".to_string()),
        strategy: StrategyKind::Static,
        priority: 10,
        description: "docs pages".to_string(),
    }]);
    assert_eq!(
        dispatcher.dispatch_url(&url("https://example.org/docs/intro")),
        StrategyKind::Static
    );
    assert_eq!(
        dispatcher.dispatch_url(&url("https://example.org/app")),
        StrategyKind::Dynamic
    );
}
