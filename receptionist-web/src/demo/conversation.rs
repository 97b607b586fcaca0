use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::DemoError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatOption {
    pub text: String,
    pub next_message_id: String,
}

/// One receptionist turn. A node either offers options, continues to a
/// single next node, or ends the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageNode {
    pub id: String,
    pub ai_text: String,
    #[serde(default)]
    pub options: Vec<ChatOption>,
    #[serde(default)]
    pub next_message_id: Option<String>,
}

impl MessageNode {
    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    pub fn is_final(&self) -> bool {
        self.options.is_empty() && self.next_message_id.is_none()
    }

    fn targets(&self) -> impl Iterator<Item = &str> {
        self.options
            .iter()
            .map(|option| option.next_message_id.as_str())
            .chain(self.next_message_id.as_deref())
    }
}

/// A script whose transitions all resolve. Deserializing runs the same
/// checks as [`ConversationScript::new`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawScript")]
pub struct ConversationScript {
    root: String,
    nodes: HashMap<String, MessageNode>,
}

#[derive(Deserialize)]
struct RawScript {
    root: String,
    nodes: HashMap<String, MessageNode>,
}

impl TryFrom<RawScript> for ConversationScript {
    type Error = DemoError;

    fn try_from(raw: RawScript) -> Result<Self, Self::Error> {
        let script = Self {
            root: raw.root,
            nodes: raw.nodes,
        };
        script.validate()?;
        Ok(script)
    }
}

impl ConversationScript {
    pub fn new(root: impl Into<String>, nodes: Vec<MessageNode>) -> Result<Self, DemoError> {
        let script = Self {
            root: root.into(),
            nodes: nodes
                .into_iter()
                .map(|node| (node.id.clone(), node))
                .collect(),
        };
        script.validate()?;
        Ok(script)
    }

    pub fn from_json(json: &str) -> Result<Self, DemoError> {
        let raw: RawScript = serde_json::from_str(json)?;
        Self::try_from(raw)
    }

    /// Every transition must land on an existing node, starting with the root.
    pub fn validate(&self) -> Result<(), DemoError> {
        if !self.nodes.contains_key(&self.root) {
            return Err(DemoError::MissingRoot(self.root.clone()));
        }

        let mut keys: Vec<&String> = self.nodes.keys().collect();
        keys.sort();
        for key in keys {
            let node = &self.nodes[key];
            if node.id != *key {
                return Err(DemoError::KeyMismatch {
                    key: key.clone(),
                    id: node.id.clone(),
                });
            }
            if let Some(target) = node.targets().find(|t| !self.nodes.contains_key(*t)) {
                return Err(DemoError::DanglingTransition {
                    from: node.id.clone(),
                    to: target.to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn root(&self) -> &MessageNode {
        &self.nodes[&self.root]
    }

    pub fn node(&self, id: &str) -> Option<&MessageNode> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of every node a visitor can reach from the root.
    pub fn reachable_from_root(&self) -> HashSet<&str> {
        let mut seen = HashSet::new();
        let mut stack = vec![self.root.as_str()];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(node) = self.nodes.get(id) {
                stack.extend(node.targets());
            }
        }
        seen
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    Receptionist { node_id: String, text: String },
    Caller { text: String },
}

impl Turn {
    pub fn is_caller(&self) -> bool {
        matches!(self, Turn::Caller { .. })
    }

    pub fn text(&self) -> &str {
        match self {
            Turn::Receptionist { text, .. } | Turn::Caller { text } => text,
        }
    }
}

/// Position in a validated script plus the transcript so far.
#[derive(Debug, Clone)]
pub struct ConversationWalker<'a> {
    script: &'a ConversationScript,
    current: &'a MessageNode,
    transcript: Vec<Turn>,
}

impl<'a> ConversationWalker<'a> {
    pub fn new(script: &'a ConversationScript) -> Self {
        Self::starting_at(script, script.root())
    }

    /// Pick up a conversation at `node_id`, e.g. from a form post.
    pub fn resume_at(script: &'a ConversationScript, node_id: &str) -> Result<Self, DemoError> {
        let node = script
            .node(node_id)
            .ok_or_else(|| DemoError::UnknownMessage(node_id.to_string()))?;
        Ok(Self::starting_at(script, node))
    }

    fn starting_at(script: &'a ConversationScript, node: &'a MessageNode) -> Self {
        Self {
            script,
            current: node,
            transcript: vec![receptionist_turn(node)],
        }
    }

    pub fn current(&self) -> &'a MessageNode {
        self.current
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn is_finished(&self) -> bool {
        self.current.is_final()
    }

    /// Follow the node-level next pointer of a node without options.
    pub fn advance(&mut self) -> Result<&'a MessageNode, DemoError> {
        let current: &'a MessageNode = self.current;
        if current.has_options() {
            return Err(DemoError::ChoiceRequired(current.id.clone()));
        }
        let next_id = current
            .next_message_id
            .as_deref()
            .ok_or_else(|| DemoError::ConversationOver(current.id.clone()))?;
        let next = self.lookup(next_id)?;

        self.current = next;
        self.transcript.push(receptionist_turn(next));
        Ok(next)
    }

    /// Answer with option `index`. An invalid index leaves the walker as it was.
    pub fn choose(&mut self, index: usize) -> Result<&'a MessageNode, DemoError> {
        let current: &'a MessageNode = self.current;
        let option = current
            .options
            .get(index)
            .ok_or_else(|| DemoError::InvalidChoice {
                node: current.id.clone(),
                index,
            })?;
        let next = self.lookup(&option.next_message_id)?;

        self.transcript.push(Turn::Caller {
            text: option.text.clone(),
        });
        self.current = next;
        self.transcript.push(receptionist_turn(next));
        Ok(next)
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.script);
    }

    fn lookup(&self, id: &str) -> Result<&'a MessageNode, DemoError> {
        self.script
            .node(id)
            .ok_or_else(|| DemoError::DanglingTransition {
                from: self.current.id.clone(),
                to: id.to_string(),
            })
    }
}

fn receptionist_turn(node: &MessageNode) -> Turn {
    Turn::Receptionist {
        node_id: node.id.clone(),
        text: node.ai_text.clone(),
    }
}
