pub struct Icons;

impl Icons {
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const SEARCH: &str = "🔍";
    pub const STATS: &str = "📊";
    pub const DATABASE: &str = "🗄️";
    pub const BUILDING: &str = "🏛️";
    pub const DOOR: &str = "🚪";
    pub const NEW: &str = "✨";
    pub const DEL: &str = "🗑️";
    pub const MOD: &str = "📝";
}
