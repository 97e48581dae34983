use crate::metrics::{Archetype, Bucket};
use crate::models::Category;

type MappingTable = &'static [(Category, &'static str, Bucket)];

const ENGINEERING_MAP: MappingTable = &[
    (Category::Activity, "code review", Bucket::CodeReview),
    (Category::Activity, "design review", Bucket::Architecture),
    (Category::Activity, "rfc review", Bucket::Architecture),
    (Category::Activity, "incident response", Bucket::BugFix),
    (Category::Contribution, "bug fix", Bucket::BugFix),
    (Category::Contribution, "architecture", Bucket::Architecture),
    (Category::Contribution, "feature", Bucket::FeatureDelivery),
    (Category::Contribution, "optimization", Bucket::FeatureDelivery),
];

const PRODUCT_MAP: MappingTable = &[
    (Category::Activity, "design review", Bucket::SpecReview),
    (Category::Activity, "rfc review", Bucket::SpecReview),
    (Category::Activity, "tech talk", Bucket::KnowledgeSharing),
    (Category::Activity, "mentoring", Bucket::KnowledgeSharing),
    (Category::Contribution, "feature", Bucket::FeatureDelivery),
];

const DESIGN_MAP: MappingTable = &[
    (Category::Activity, "design review", Bucket::DesignReview),
    (Category::Activity, "mentoring", Bucket::Mentoring),
    (Category::Contribution, "architecture", Bucket::Architecture),
];

const MARKETING_MAP: MappingTable = &[
    (Category::Activity, "tech talk", Bucket::KnowledgeSharing),
    (Category::Activity, "mentoring", Bucket::Mentoring),
];

fn table_for(archetype: Archetype) -> MappingTable {
    match archetype {
        Archetype::Engineering | Archetype::Default => ENGINEERING_MAP,
        Archetype::Product => PRODUCT_MAP,
        Archetype::Design => DESIGN_MAP,
        Archetype::Marketing => MARKETING_MAP,
    }
}

/// Bucket for a raw record of a team, or `None` when the archetype has no
/// mapping for it. Unmapped records still count toward total activity.
pub fn map_event(team_name: &str, category: Category, raw_type_label: &str) -> Option<Bucket> {
    map_for_archetype(Archetype::for_team(team_name), category, raw_type_label)
}

pub fn map_for_archetype(
    archetype: Archetype,
    category: Category,
    raw_type_label: &str,
) -> Option<Bucket> {
    let label = raw_type_label.trim();
    table_for(archetype)
        .iter()
        .find(|(entry_category, entry_label, _)| {
            *entry_category == category && entry_label.eq_ignore_ascii_case(label)
        })
        .map(|(_, _, bucket)| *bucket)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engineering_team_maps_reviews_and_fixes() {
        assert_eq!(
            map_event("Engineering Team", Category::Activity, "Code Review"),
            Some(Bucket::CodeReview)
        );
        assert_eq!(
            map_event("Engineering Team", Category::Contribution, " bug fix "),
            Some(Bucket::BugFix)
        );
    }

    #[test]
    fn category_disambiguates_labels() {
        assert_eq!(
            map_event("Engineering Team", Category::Activity, "Architecture"),
            None
        );
        assert_eq!(
            map_event("Engineering Team", Category::Contribution, "Architecture"),
            Some(Bucket::Architecture)
        );
    }

    #[test]
    fn archetype_changes_the_bucket() {
        assert_eq!(
            map_event("Product Squad", Category::Activity, "Design Review"),
            Some(Bucket::SpecReview)
        );
        assert_eq!(
            map_event("Design Studio", Category::Activity, "Design Review"),
            Some(Bucket::DesignReview)
        );
        assert_eq!(
            map_event("Growth Marketing", Category::Contribution, "Feature"),
            None
        );
    }

    #[test]
    fn unmatched_team_uses_default_table() {
        assert_eq!(
            map_event("Synergize Paradigms Team", Category::Contribution, "Optimization"),
            Some(Bucket::FeatureDelivery)
        );
        assert_eq!(
            map_event("Synergize Paradigms Team", Category::Contribution, "Refactor"),
            None
        );
    }
}
