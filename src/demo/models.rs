use std::collections::BTreeMap;

use serde_derive::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct UserModel {
    #[serde(default)]
    pub id: u64,
    pub name: String,
}

impl UserModel {
    pub fn new(name: &str) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FriendshipModel {
    pub user_id1: u64,
    pub user_id2: u64,
}

impl FriendshipModel {
    /// 关系中的另一方；`user_id` 不在关系中时返回 `None`
    pub fn other(&self, user_id: u64) -> Option<u64> {
        if self.user_id1 == user_id {
            Some(self.user_id2)
        } else if self.user_id2 == user_id {
            Some(self.user_id1)
        } else {
            None
        }
    }
}

/// 内存中的用户集合，id 从 1 开始递增分配
#[derive(Debug, Default)]
pub struct UserCollection {
    users: BTreeMap<u64, UserModel>,
    next_user_id: u64,
}

impl UserCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// 分配新 id 并保存，忽略传入的 id
    pub fn add(&mut self, mut user: UserModel) -> UserModel {
        self.next_user_id += 1;
        user.id = self.next_user_id;
        self.users.insert(user.id, user.clone());
        user
    }

    pub fn get(&self, id: u64) -> Option<&UserModel> {
        self.users.get(&id)
    }

    /// 按指定 id 写入，已存在时覆盖
    pub fn set(&mut self, id: u64, mut user: UserModel) -> UserModel {
        user.id = id;
        self.users.insert(id, user.clone());
        if id > self.next_user_id {
            self.next_user_id = id;
        }
        user
    }

    /// 按 id 升序返回全部用户
    pub fn get_all(&self) -> Vec<&UserModel> {
        self.users.values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_assigns_ids() {
        let mut users = UserCollection::new();
        assert_eq!(users.add(UserModel::new("John")).id, 1);
        assert_eq!(users.add(UserModel { id: 99, name: "Paul".to_string() }).id, 2);
        assert_eq!(users.get(2).map(|u| u.name.as_str()), Some("Paul"));
        assert!(users.get(99).is_none());
    }

    #[test]
    fn test_set_overwrites_and_advances() {
        let mut users = UserCollection::new();
        users.add(UserModel::new("John"));
        users.set(1, UserModel::new("Johnny"));
        users.set(5, UserModel::new("Pete"));

        assert_eq!(users.get(1).unwrap().name, "Johnny");
        assert_eq!(users.add(UserModel::new("Next")).id, 6);
        let ids: Vec<u64> = users.get_all().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 5, 6]);
    }

    #[test]
    fn test_friendship_other() {
        let f = FriendshipModel { user_id1: 1, user_id2: 3 };
        assert_eq!(f.other(1), Some(3));
        assert_eq!(f.other(3), Some(1));
        assert_eq!(f.other(2), None);
    }
}
