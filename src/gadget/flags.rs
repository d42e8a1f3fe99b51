use bitflags::bitflags;

bitflags! {
    /// When and how a gadget reports activity.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
    pub struct Activation: u16 {
        /// Raise a down notification as soon as the gadget is pressed.
        const IMMEDIATE = 1 << 0;
        /// Raise an up notification when released with the pointer still inside.
        const REL_VERIFY = 1 << 1;
        /// Each completed click flips the selected state.
        const TOGGLE_SELECT = 1 << 2;
        /// Reachable with Tab / Shift+Tab.
        const TAB_CYCLE = 1 << 3;
        /// Report every knob movement while dragging.
        const FOLLOW_MOUSE = 1 << 4;
        const LEFT_BORDER = 1 << 5;
        const RIGHT_BORDER = 1 << 6;
        const TOP_BORDER = 1 << 7;
        const BOTTOM_BORDER = 1 << 8;
    }
}

impl Activation {
    pub const BORDER: Self = Self::LEFT_BORDER
        .union(Self::RIGHT_BORDER)
        .union(Self::TOP_BORDER)
        .union(Self::BOTTOM_BORDER);

    /// Border gadgets resolve against the owner's full bounds, not its inner frame.
    pub fn is_border_anchored(self) -> bool {
        self.intersects(Self::BORDER)
    }
}

bitflags! {
    /// Mutable visual state of a gadget.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
    pub struct GadgetFlags: u8 {
        const SELECTED = 1 << 0;
        const DISABLED = 1 << 1;
        const HOVER = 1 << 2;
    }
}

/// Window decoration gadgets, identified by reserved negative gadget ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemGadget {
    Drag,
    Close,
    Depth,
    Zoom,
    Size,
}

impl SystemGadget {
    pub const ALL: [SystemGadget; 5] = [
        SystemGadget::Drag,
        SystemGadget::Close,
        SystemGadget::Depth,
        SystemGadget::Zoom,
        SystemGadget::Size,
    ];

    pub const fn id(self) -> i32 {
        match self {
            SystemGadget::Drag => -1,
            SystemGadget::Close => -2,
            SystemGadget::Depth => -3,
            SystemGadget::Zoom => -4,
            SystemGadget::Size => -5,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|gadget| gadget.id() == id)
    }
}

/// Opaque icon handle resolved by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct IconId(pub u32);
