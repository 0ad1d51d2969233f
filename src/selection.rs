use crate::editor::TopologyEditor;
use crate::shared::{ASRole, ASN};

/// ASNs a picker may offer for one slot of a form.
///
/// `reserved_slots` holds the values already chosen in the form, `None` for
/// empty slots. An ASN is offered if no slot holds it, or if only the slot
/// at `current_slot_index` does, so the slot being edited can keep its own
/// value. `excluded_asn` is never offered. Result is sorted ascending.
pub fn candidate_asns<I>(
    all_nodes: I,
    reserved_slots: &[Option<ASN>],
    current_slot_index: usize,
    excluded_asn: Option<ASN>,
) -> Vec<ASN>
where
    I: IntoIterator<Item = ASN>,
{
    let current = reserved_slots.get(current_slot_index).copied().flatten();
    let mut candidates: Vec<ASN> = all_nodes
        .into_iter()
        .filter(|&asn| Some(asn) != excluded_asn)
        .filter(|&asn| Some(asn) == current || !reserved_slots.contains(&Some(asn)))
        .collect();
    candidates.sort_unstable();
    candidates.dedup();
    candidates
}

pub fn all_asns<I>(all_nodes: I) -> Vec<ASN>
where
    I: IntoIterator<Item = ASN>,
{
    let mut asns: Vec<ASN> = all_nodes.into_iter().collect();
    asns.sort_unstable();
    asns.dedup();
    asns
}

/// The victim an announcement form defaults to
pub fn current_victim(editor: &TopologyEditor) -> Option<ASN> {
    editor.graph().asns_with_role(ASRole::Victim).first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_slot_keeps_its_value() {
        let nodes = vec![5, 1, 3, 2, 4];
        let slots = [Some(1), Some(3), None];

        assert_eq!(candidate_asns(nodes.clone(), &slots, 1, None), vec![2, 3, 4, 5]);
        assert_eq!(candidate_asns(nodes.clone(), &slots, 0, None), vec![1, 2, 4, 5]);
        assert_eq!(candidate_asns(nodes, &slots, 2, None), vec![2, 4, 5]);
    }

    #[test]
    fn test_excluded_asn_wins_over_current_slot() {
        let slots = [Some(7)];
        assert_eq!(candidate_asns([7, 8, 9], &slots, 0, Some(7)), vec![8, 9]);
        assert_eq!(candidate_asns([7, 8, 9], &slots, 0, Some(9)), vec![7, 8]);
    }

    #[test]
    fn test_out_of_range_slot_edits_nothing() {
        let slots = [Some(1), Some(2)];
        assert_eq!(candidate_asns([1, 2, 3], &slots, 10, None), vec![3]);
    }

    #[test]
    fn test_all_asns_sorted() {
        assert_eq!(all_asns([30, 10, 20, 10]), vec![10, 20, 30]);
    }

    #[test]
    fn test_current_victim() {
        let mut editor = TopologyEditor::new();
        assert_eq!(current_victim(&editor), None);

        editor.add_as(10).unwrap();
        editor.add_as(4).unwrap();
        editor.set_role(10, ASRole::Victim).unwrap();
        editor.set_role(4, ASRole::Victim).unwrap();
        assert_eq!(current_victim(&editor), Some(4));
    }
}
