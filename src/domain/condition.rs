use alloy_primitives::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Shape of the calldata region a condition node inspects. Discriminants
/// mirror the deployed role-module contract.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum ParameterType {
    #[default]
    None = 0,
    Static = 1,
    Dynamic = 2,
    Tuple = 3,
    Array = 4,
    Calldata = 5,
    AbiEncoded = 6,
}

/// Combinator or comparison a condition node applies. Discriminants mirror
/// the deployed role-module contract; the gaps are reserved there.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum Operator {
    #[default]
    Pass = 0,
    And = 1,
    Or = 2,
    Nor = 3,
    Matches = 5,
    ArraySome = 6,
    ArrayEvery = 7,
    ArraySubset = 8,
    EqualToAvatar = 15,
    EqualTo = 16,
    GreaterThan = 17,
    LessThan = 18,
    SignedIntGreaterThan = 19,
    SignedIntLessThan = 20,
    Bitmask = 21,
    Custom = 22,
    WithinAllowance = 28,
    EtherWithinAllowance = 29,
    CallWithinAllowance = 30,
}

/// One node of a flattened condition tree.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ConditionFlat {
    pub parent: u8,
    pub param_type: ParameterType,
    pub operator: Operator,
    pub comp_value: Bytes,
}

/// A condition tree in arena form: nodes in evaluation order, each `parent`
/// an index into the same sequence.
///
/// Construction enforces that node 0 is its own parent and every later node's
/// parent strictly precedes it, so the tree is buildable in one forward pass
/// and a cycle cannot be expressed at all. Deliberately not deserializable;
/// the only way in is [`ConditionList::new`].
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ConditionList {
    nodes: Vec<ConditionFlat>,
}

impl ConditionList {
    /// Validate `nodes` and take ownership. Fails with
    /// [`Error::InvalidConditionIndex`] on the first node whose parent does
    /// not precede it; nothing is deferred to encoding time.
    pub fn new(nodes: Vec<ConditionFlat>) -> Result<Self, Error> {
        for (index, node) in nodes.iter().enumerate() {
            let parent = usize::from(node.parent);
            let well_placed = if index == 0 {
                parent == 0
            } else {
                parent < index
            };
            if !well_placed {
                return Err(Error::InvalidConditionIndex {
                    index,
                    parent: node.parent,
                });
            }
        }
        Ok(Self { nodes })
    }

    pub fn nodes(&self) -> &[ConditionFlat] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{ConditionFlat, ConditionList, Operator, ParameterType};
    use crate::error::Error;
    use alloy_primitives::Bytes;

    fn node(parent: u8, operator: Operator) -> ConditionFlat {
        ConditionFlat {
            parent,
            param_type: ParameterType::Static,
            operator,
            comp_value: Bytes::new(),
        }
    }

    #[test]
    fn accepts_well_formed_tree() {
        let list = ConditionList::new(vec![
            node(0, Operator::Matches),
            node(0, Operator::EqualTo),
            node(0, Operator::Pass),
            node(1, Operator::EqualTo),
        ])
        .expect("forward-referencing tree should validate");
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn accepts_empty_list() {
        let list = ConditionList::new(Vec::new()).expect("empty list is a valid tree");
        assert!(list.is_empty());
    }

    #[test]
    fn rejects_parent_that_does_not_precede_node() {
        let err = ConditionList::new(vec![node(0, Operator::Matches), node(1, Operator::EqualTo)])
            .expect_err("self-referencing non-root node must fail");
        assert!(matches!(
            err,
            Error::InvalidConditionIndex {
                index: 1,
                parent: 1
            }
        ));
    }

    #[test]
    fn rejects_forward_pointing_parent() {
        let err = ConditionList::new(vec![node(0, Operator::Matches), node(3, Operator::EqualTo)])
            .expect_err("parent beyond position must fail");
        assert!(matches!(err, Error::InvalidConditionIndex { index: 1, .. }));
    }

    #[test]
    fn rejects_non_self_rooted_first_node() {
        let err = ConditionList::new(vec![node(2, Operator::Matches)])
            .expect_err("node 0 must point at itself");
        assert!(matches!(
            err,
            Error::InvalidConditionIndex {
                index: 0,
                parent: 2
            }
        ));
    }
}
