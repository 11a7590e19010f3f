use serde::Serialize;

use crate::models::FilterState;

/// 当前筛选条件相对上次提交的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterStatus {
    /// 指纹与上次提交一致
    Clean,
    /// 已偏离上次提交
    Dirty,
}

/// 搜索按钮相对视口的位置（逻辑像素）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ControlPlacement {
    pub top: i32,
    pub bottom: i32,
    pub viewport_height: u32,
}

impl ControlPlacement {
    pub fn new(top: i32, bottom: i32, viewport_height: u32) -> Self {
        Self {
            top,
            bottom,
            viewport_height,
        }
    }

    pub fn is_fully_visible(&self) -> bool {
        self.top >= 0 && i64::from(self.bottom) <= i64::from(self.viewport_height)
    }
}

impl Default for ControlPlacement {
    fn default() -> Self {
        Self::new(0, 0, 0)
    }
}

/// 变更检测：比较实时筛选快照与上次提交的指纹，并决定搜索按钮是否悬浮
#[derive(Debug, Clone)]
pub struct ChangeDetector {
    committed: Option<String>,
    status: FilterStatus,
    placement: ControlPlacement,
    floating: bool,
}

impl ChangeDetector {
    pub fn new(placement: ControlPlacement) -> Self {
        Self {
            committed: None,
            status: FilterStatus::Clean,
            placement,
            floating: false,
        }
    }

    pub fn status(&self) -> FilterStatus {
        self.status
    }

    pub fn is_floating(&self) -> bool {
        self.floating
    }

    pub fn committed_fingerprint(&self) -> Option<&str> {
        self.committed.as_deref()
    }

    /// 重新计算状态；首次提交之前始终视为 Clean
    pub fn evaluate(&mut self, state: &FilterState) -> FilterStatus {
        self.status = match self.committed {
            Some(ref fingerprint) if *fingerprint != state.fingerprint() => FilterStatus::Dirty,
            _ => FilterStatus::Clean,
        };
        self.refresh_floating();
        self.status
    }

    /// 搜索完成后记录新的指纹
    pub fn commit(&mut self, state: &FilterState) {
        self.committed = Some(state.fingerprint());
        self.status = FilterStatus::Clean;
        self.refresh_floating();
    }

    /// 滚动或尺寸变化：只有可见性变了，状态不变
    pub fn update_placement(&mut self, placement: ControlPlacement) -> bool {
        self.placement = placement;
        self.refresh_floating();
        self.floating
    }

    fn refresh_floating(&mut self) {
        let floating =
            self.status == FilterStatus::Dirty && !self.placement.is_fully_visible();
        if floating != self.floating {
            tracing::debug!("Floating search action {}", if floating { "on" } else { "off" });
        }
        self.floating = floating;
    }
}
