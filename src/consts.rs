/// Month index for February (months are 0-based inside columns)
pub const FEBRUARY: u32 = 1;

/// First day of month, used for lower bounds
pub const MIN_DAY: u32 = 1;

/// Days in February for leap years
pub const FEBRUARY_DAYS_LEAP: u32 = 29;

/// Days in each month of a non-leap year, indexed by 0-based month
pub const DAYS_IN_MONTH: [u32; 12] = [
    31, // January
    28, // February (non-leap, adjusted by is_leap_year check)
    31, // March
    30, // April
    31, // May
    30, // June
    31, // July
    31, // August
    30, // September
    31, // October
    30, // November
    31, // December
];

/// Leap year occurs every 4 years
pub(crate) const LEAP_YEAR_CYCLE: i32 = 4;
/// Century years are not leap years unless...
pub(crate) const CENTURY_CYCLE: i32 = 100;
/// ...they are divisible by 400 (Gregorian calendar correction)
pub(crate) const GREGORIAN_CYCLE: i32 = 400;

/// Years added to the true year when the Buddhist era display is enabled
pub const BUDDHIST_ERA_OFFSET: i32 = 543;

/// Two-digit years below this value decode into the 2000s, the rest into the 1900s
pub const TWO_DIGIT_YEAR_PIVOT: i32 = 69;

/// Span of a two-digit year column
pub const TWO_DIGIT_YEAR_SPAN: i32 = 100;

/// Smallest number of visible rows a column may have
pub const MIN_ROWS: usize = 5;

/// Extra rows rendered above and below the visible window
pub const OVERSCAN_ROWS: usize = 2;

/// Format used when the caller does not supply one
pub const DEFAULT_FORMAT: &str = "YYYY-MM-DD HH:mm";

/// Nanoseconds per millisecond
pub(crate) const NANOS_PER_MILLI: u32 = 1_000_000;
