//! Centralized icon definitions.
//!
//! Icon theme is configured in `config.rs` via `ICON_THEME`.
//! This module maps semantic icon names to the selected theme's icons.

use icondata::Icon;

use webfm::config::IconTheme;
use webfm::models::FileType;

// =============================================================================
// Theme Imports
// =============================================================================

mod lucide {
    pub use icondata::{
        LuArrowUp as ArrowUp, LuChevronRight as ChevronRight, LuClipboardPaste as Paste,
        LuCopy as Copy, LuDownload as Download, LuExternalLink as ExternalLink, LuFile as File, LuFileText as FileText, LuFolder as Folder,
        LuFolderPlus as FolderPlus, LuHouse as Home, LuImage as FileImage, LuPencil as Edit,
        LuRefreshCw as Refresh, LuScissors as Cut, LuServer as Server, LuTrash2 as Trash,
        LuUpload as Upload, LuX as Close,
    };
}

mod bootstrap {
    pub use icondata::{
        BsArrowClockwise as Refresh, BsArrowUp as ArrowUp, BsChevronRight as ChevronRight,
        BsBoxArrowUpRight as ExternalLink, BsClipboard as Paste, BsDownload as Download,
        BsFileEarmark as File, BsFileEarmarkImage as FileImage,
        BsFileEarmarkText as FileText, BsFiles as Copy,
        BsFolderFill as Folder, BsFolderPlus as FolderPlus, BsHddNetwork as Server,
        BsHouseFill as Home, BsPencil as Edit, BsScissors as Cut, BsTrash as Trash,
        BsUpload as Upload, BsXLg as Close,
    };
}

// =============================================================================
// Icon Constants (selected based on theme)
// =============================================================================

macro_rules! themed_icon {
    ($name:ident, $theme_name:ident) => {
        pub const $name: Icon = match webfm::config::ICON_THEME {
            IconTheme::Lucide => lucide::$theme_name,
            IconTheme::Bootstrap => bootstrap::$theme_name,
        };
    };
}

themed_icon!(CHEVRON_RIGHT, ChevronRight);
themed_icon!(HOME, Home);
themed_icon!(SERVER, Server);
themed_icon!(FOLDER, Folder);
themed_icon!(FILE, File);
themed_icon!(FILE_TEXT, FileText);
themed_icon!(FILE_IMAGE, FileImage);
themed_icon!(ARROW_UP, ArrowUp);
themed_icon!(REFRESH, Refresh);
themed_icon!(FOLDER_PLUS, FolderPlus);
themed_icon!(UPLOAD, Upload);
themed_icon!(EDIT, Edit);
themed_icon!(CUT, Cut);
themed_icon!(COPY, Copy);
themed_icon!(PASTE, Paste);
themed_icon!(TRASH, Trash);
themed_icon!(CLOSE, Close);
themed_icon!(DOWNLOAD, Download);
themed_icon!(EXTERNAL_LINK, ExternalLink);

/// Icon for a listing entry.
pub fn for_file_type(file_type: FileType) -> Icon {
    match file_type {
        FileType::Directory => FOLDER,
        FileType::Markdown | FileType::Text => FILE_TEXT,
        FileType::Image => FILE_IMAGE,
        FileType::Unknown => FILE,
    }
}
