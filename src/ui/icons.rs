pub struct Icons;

impl Icons {
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const FILE: &str = "📄";
    pub const DATABASE: &str = "🗄️";
    pub const PERSON: &str = "👤";
    pub const COLUMNS: &str = "🧱";
    pub const DELETE: &str = "🗑️";
}
