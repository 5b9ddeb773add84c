//! Volatile editor session: active workspace tab, selection and playhead.
//!
//! None of this is written to the project document.

use serde::{Deserialize, Serialize};

/// Workspace views of the editor.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceTab {
    #[default]
    Script,
    Visual,
    Arrange,
}

impl WorkspaceTab {
    pub const ALL: [WorkspaceTab; 3] = [
        WorkspaceTab::Script,
        WorkspaceTab::Visual,
        WorkspaceTab::Arrange,
    ];

    pub fn label(self) -> &'static str {
        match self {
            WorkspaceTab::Script => "脚本工作台",
            WorkspaceTab::Visual => "视觉匹配",
            WorkspaceTab::Arrange => "编排工作台",
        }
    }

    pub fn short_label(self) -> &'static str {
        match self {
            WorkspaceTab::Script => "脚本",
            WorkspaceTab::Visual => "视觉",
            WorkspaceTab::Arrange => "编排",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            WorkspaceTab::Script => "AI 驱动的脚本生成与分镜创建",
            WorkspaceTab::Visual => "语义视觉匹配与素材关联",
            WorkspaceTab::Arrange => "多轨时间线编排与配音配乐",
        }
    }

    pub fn index(self) -> usize {
        match self {
            WorkspaceTab::Script => 0,
            WorkspaceTab::Visual => 1,
            WorkspaceTab::Arrange => 2,
        }
    }

    /// Next tab; stays put on the last one.
    pub fn next(self) -> Self {
        Self::ALL
            .get(self.index() + 1)
            .copied()
            .unwrap_or(self)
    }

    /// Previous tab; stays put on the first one.
    pub fn prev(self) -> Self {
        match self.index() {
            0 => self,
            i => Self::ALL[i - 1],
        }
    }
}

/// Editor session state owned by the store next to the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub current_tab: WorkspaceTab,
    pub selected_shot_id: Option<String>,
    pub selected_asset_id: Option<String>,
    /// Seconds. Not clamped here.
    pub playhead_time: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_navigation_saturates() {
        assert_eq!(WorkspaceTab::Script.next(), WorkspaceTab::Visual);
        assert_eq!(WorkspaceTab::Arrange.next(), WorkspaceTab::Arrange);
        assert_eq!(WorkspaceTab::Script.prev(), WorkspaceTab::Script);
        assert_eq!(WorkspaceTab::Arrange.prev(), WorkspaceTab::Visual);
    }

    #[test]
    fn test_default_session() {
        let session = Session::default();
        assert_eq!(session.current_tab, WorkspaceTab::Script);
        assert!(session.selected_shot_id.is_none());
        assert_eq!(session.playhead_time, 0.0);
    }
}
