pub fn group_members_key(group_id: &str) -> String {
    format!("group_members:{}", group_id)
}
