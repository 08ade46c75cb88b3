//! OIDs of the controls and extended operations this registry knows
//! about (spec §4.2). Grouped by RFC/vendor source in comments, not by
//! any semantic property the crate reasons about.

// RFC 2696
pub const PAGED_RESULTS: &str = "1.2.840.113556.1.4.319";
// RFC 2891
pub const SORT_REQUEST: &str = "1.2.840.113556.1.4.473";
pub const SORT_RESPONSE: &str = "1.2.840.113556.1.4.474";
// draft-behera-ldap-password-policy
pub const PASSWORD_POLICY: &str = "1.3.6.1.4.1.42.2.27.8.5.1";
// RFC 3928 / persistent-search family
pub const ENTRY_CHANGE_NOTIFICATION: &str = "2.16.840.1.113730.3.4.7";
pub const PERSISTENT_SEARCH: &str = "2.16.840.1.113730.3.4.3";
// RFC 3296
pub const MANAGE_DSA_IT: &str = "2.16.840.1.113730.3.4.2";
// RFC 3672
pub const SUBENTRIES: &str = "1.3.6.1.4.1.4203.1.10.1";
// RFC 4370
pub const PROXIED_AUTHORIZATION: &str = "2.16.840.1.113730.3.4.18";
// Microsoft AD-DS extensions (MS-ADTS)
pub const AD_DIRSYNC: &str = "1.2.840.113556.1.4.841";
pub const AD_SHOW_DELETED: &str = "1.2.840.113556.1.4.417";
pub const AD_POLICY_HINTS: &str = "1.2.840.113556.1.4.2239";
// RFC 4533
pub const SYNC_REQUEST: &str = "1.3.6.1.4.1.4203.1.9.1.1";
pub const SYNC_STATE: &str = "1.3.6.1.4.1.4203.1.9.1.2";
pub const SYNC_DONE: &str = "1.3.6.1.4.1.4203.1.9.1.3";
// RFC 2891 (Virtual List View)
pub const VLV_REQUEST: &str = "2.16.840.1.113730.3.4.9";
pub const VLV_RESPONSE: &str = "2.16.840.1.113730.3.4.10";
// RFC 5805
pub const TRANSACTION_SPECIFICATION: &str = "1.3.6.1.1.21.2";
pub const START_TRANSACTION: &str = "1.3.6.1.1.21.1";
pub const END_TRANSACTION: &str = "1.3.6.1.1.21.3";
