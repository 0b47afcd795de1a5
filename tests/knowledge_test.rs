use wastesort::{KnowledgeBase, KnowledgeError, Label, LinkKind};

#[test]
fn test_every_label_has_complete_guidance() {
    let kb = KnowledgeBase::builtin();
    for label in Label::ALL {
        let info = kb.lookup(label);
        assert!(!info.description.trim().is_empty(), "{} has no description", label);
        assert!(!info.example_items.is_empty(), "{} has no example items", label);
        assert!(!info.disposal_tips.is_empty(), "{} has no disposal tips", label);
        assert!(info.reference_links.iter().any(|l| l.kind == LinkKind::Video));
        assert!(info.reference_links.iter().any(|l| l.kind == LinkKind::Article));
    }
}

#[test]
fn test_glass_guidance_mentions_recycling() {
    let info = KnowledgeBase::builtin().lookup(Label::Glass);
    assert!(info.disposal_tips.iter().any(|tip| tip.to_lowercase().contains("recycl")));
    assert_eq!(info.example_items[0], "Glass bottles (wine bottles, soda bottles)");
}

#[test]
fn test_lookup_by_name() {
    let kb = KnowledgeBase::builtin();
    let (label, info) = kb.get("Organic Waste").unwrap();
    assert_eq!(label, Label::OrganicWaste);
    assert!(info.disposal_tips[0].starts_with("Composting"));

    let err = kb.get("Textiles").unwrap_err();
    assert!(matches!(err, KnowledgeError::UnknownLabel(ref name) if name == "Textiles"));
}

#[test]
fn test_incomplete_catalog_is_rejected() {
    let json = r#"{"categories": [
        {"label": "Battery", "description": "", "example_items": ["AA cells"], "disposal_tips": ["Drop-off"],
         "reference_links": [{"kind": "article", "title": "Read", "url": "https://example.org/b"}]}
    ]}"#;
    let err = KnowledgeBase::from_json(json).unwrap_err();
    assert!(matches!(err, KnowledgeError::Incomplete { label: Label::Battery, field: "description" }));
}

#[test]
fn test_non_http_link_is_rejected() {
    let json = r#"{"categories": [
        {"label": "Metal", "description": "Cans", "example_items": ["Cans"], "disposal_tips": ["Recycle"],
         "reference_links": [{"kind": "video", "title": "Watch", "url": "javascript:alert(1)"}]}
    ]}"#;
    let err = KnowledgeBase::from_json(json).unwrap_err();
    assert!(matches!(err, KnowledgeError::InvalidLink { label: Label::Metal, .. }));
}
