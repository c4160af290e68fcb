//! 用户管理
//!
//! 列表页支持搜索、排序、启用/停用、授予/撤销管理员与删除；
//! 详情页额外展示该用户的报名记录。

use crate::components::layout::AdminNav;
use crate::components::ui::{
    Alert, Card, Loading, Notice, RoleBadge, StatusBadge, confirm, local_datetime,
};
use crate::context::{AppDispatcher, AppStore, use_dispatcher, use_store};
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};
use campusconnect::query::{ListQuery, UserSort};
use campusconnect_shared::{Id, User};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 用户上的管理动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UserAction {
    ToggleActive,
    ToggleAdmin,
    Delete,
}

fn run_action(
    dispatcher: AppDispatcher,
    store: AppStore,
    user: User,
    action: UserAction,
    notice: RwSignal<Option<Notice>>,
    after_delete: impl FnOnce() + 'static,
) {
    if action == UserAction::Delete
        && !confirm(&format!("Delete the account of {}? This cannot be undone.", user.email))
    {
        return;
    }
    spawn_local(async move {
        let cell = &store.users;
        match action {
            UserAction::ToggleActive => {
                let message = if user.is_active { "User deactivated." } else { "User activated." };
                let settled = dispatcher.toggle_user_active(cell, &user).await;
                notice.set(Notice::from_settled(&settled, message));
            }
            UserAction::ToggleAdmin => {
                let message = if user.is_admin() {
                    "Admin rights revoked."
                } else {
                    "Admin rights granted."
                };
                let settled = dispatcher.toggle_user_admin(cell, &user).await;
                notice.set(Notice::from_settled(&settled, message));
            }
            UserAction::Delete => {
                let settled = dispatcher.delete_user(cell, user.id).await;
                let done = settled.is_fulfilled();
                notice.set(Notice::from_settled(&settled, "User deleted."));
                if done {
                    after_delete();
                }
            }
        }
    });
}

/// 用户操作按钮组，当前登录的管理员不能操作自己
#[component]
fn UserActions(
    user: User,
    dispatcher: AppDispatcher,
    notice: RwSignal<Option<Notice>>,
    #[prop(optional)] on_deleted: Option<Callback<()>>,
) -> impl IntoView {
    let store = use_store();
    let is_self = store
        .auth
        .0
        .with_untracked(|a| a.user.as_ref().is_some_and(|me| me.id == user.id));
    if is_self {
        return view! { <span class="text-xs text-base-content/50">"(you)"</span> }.into_any();
    }

    let active_label = if user.is_active { "Deactivate" } else { "Activate" };
    let admin_label = if user.is_admin() { "Revoke admin" } else { "Make admin" };
    let act = move |action: UserAction| {
        let dispatcher = dispatcher.clone();
        let user = user.clone();
        move |_| {
            run_action(dispatcher.clone(), store, user.clone(), action, notice, move || {
                if let Some(cb) = on_deleted {
                    cb.run(());
                }
            })
        }
    };

    view! {
        <button class="btn btn-xs" on:click=act(UserAction::ToggleActive)>{active_label}</button>
        <button class="btn btn-xs" on:click=act(UserAction::ToggleAdmin)>{admin_label}</button>
        <button class="btn btn-error btn-xs" on:click=act(UserAction::Delete)>"Delete"</button>
    }
    .into_any()
}

#[component]
pub fn AdminUsersPage() -> impl IntoView {
    let store = use_store();
    let dispatcher = use_dispatcher();
    let users = store.users.0;
    let query = RwSignal::new(ListQuery::<UserSort>::default());
    let notice = RwSignal::new(Option::<Notice>::None);

    {
        let dispatcher = dispatcher.clone();
        spawn_local(async move {
            dispatcher.get_users(&store.users).await;
        });
    }

    let visible = move || users.with(|s| query.with(|q| q.apply(&s.items)));
    let header = move |key: UserSort, label: &'static str| {
        view! {
            <th class="cursor-pointer select-none" on:click=move |_| query.update(|q| q.sort_by(key))>
                {label}
                {move || query.with(|q| (q.sort == key).then(|| format!(" {}", q.direction.arrow())))}
            </th>
        }
    };

    view! {
        <AdminNav />
        <div class="flex flex-wrap gap-4 justify-between items-center">
            <h1 class="text-3xl font-bold">"Manage Users"</h1>
            <input
                type="search"
                placeholder="Search by name or email..."
                class="input input-bordered"
                on:input=move |ev| query.update(|q| q.term = event_target_value(&ev))
                prop:value=move || query.with(|q| q.term.clone())
            />
        </div>
        <Alert notice=notice />
        {move || users.with(|s| s.error.clone()).map(|e| view! {
            <div role="alert" class="alert alert-error">{e}</div>
        })}

        <Show
            when=move || !users.with(|s| s.is_loading && s.items.is_empty())
            fallback=|| view! { <Loading /> }
        >
            <div class="overflow-x-auto bg-base-100 rounded-box shadow">
                <table class="table">
                    <thead>
                        <tr>
                            {header(UserSort::Name, "Name")}
                            {header(UserSort::Email, "Email")}
                            <th>"Role"</th>
                            <th>"Status"</th>
                            {header(UserSort::CreatedAt, "Joined")}
                            <th></th>
                        </tr>
                    </thead>
                    <tbody>
                        <For each=visible key=|u| (u.id, u.role, u.is_active) let:user>
                            <tr>
                                <td>
                                    <Link to=AppRoute::AdminUserDetail(user.id).to_path() class="link link-hover">
                                        {user.name.clone()}
                                    </Link>
                                </td>
                                <td>{user.email.clone()}</td>
                                <td><RoleBadge role=user.role /></td>
                                <td>{if user.is_active { "Active" } else { "Inactive" }}</td>
                                <td>{local_datetime(user.created_at.as_ref())}</td>
                                <td class="flex gap-1 justify-end">
                                    <UserActions user=user.clone() dispatcher=dispatcher.clone() notice=notice />
                                </td>
                            </tr>
                        </For>
                    </tbody>
                </table>
            </div>
        </Show>
    }
}

#[component]
pub fn AdminUserDetailPage(id: Id) -> impl IntoView {
    let store = use_store();
    let dispatcher = use_dispatcher();
    let router = use_router();
    let users = store.users.0;
    let registrations = store.registrations.0;
    let notice = RwSignal::new(Option::<Notice>::None);

    users.update(|s| s.clear_current());
    {
        let dispatcher = dispatcher.clone();
        spawn_local(async move {
            futures::join!(
                dispatcher.get_user(&store.users, id),
                dispatcher.get_registrations_by_user(&store.registrations, id),
            );
        });
    }

    // 列表里的切换动作更新的是 items，这里优先取 items 中的最新数据
    let user = move || {
        users.with(|s| {
            s.find(id)
                .cloned()
                .or_else(|| s.current.clone().filter(|u| u.id == id))
        })
    };
    let on_deleted = Callback::new(move |_| router.navigate_to(&AppRoute::AdminUsers));

    view! {
        <AdminNav />
        <Alert notice=notice />
        {move || match user() {
            None if users.with(|s| s.is_loading) => view! { <Loading /> }.into_any(),
            None => view! {
                <div role="alert" class="alert alert-error">
                    {users.with(|s| s.error.clone()).unwrap_or_else(|| "User not found.".to_string())}
                </div>
            }.into_any(),
            Some(user) => view! {
                <Card title=user.name.clone()>
                    <div class="grid md:grid-cols-2 gap-2 text-sm">
                        <p><b>"Email: "</b>{user.email.clone()}</p>
                        <p><b>"Phone: "</b>{user.phone.clone().unwrap_or_else(|| "N/A".to_string())}</p>
                        <p><b>"Role: "</b><RoleBadge role=user.role /></p>
                        <p><b>"Status: "</b>{if user.is_active { "Active" } else { "Inactive" }}</p>
                        <p><b>"Joined: "</b>{local_datetime(user.created_at.as_ref())}</p>
                        {user.guest_code.clone().map(|c| view! { <p><b>"Guest code: "</b>{c}</p> })}
                    </div>
                    <div class="card-actions justify-end">
                        <UserActions user=user.clone() dispatcher=dispatcher.clone() notice=notice on_deleted=on_deleted />
                    </div>
                </Card>
            }.into_any(),
        }}

        <h2 class="text-xl font-semibold">"Registrations"</h2>
        <div class="overflow-x-auto bg-base-100 rounded-box shadow">
            <table class="table">
                <thead><tr><th>"Event"</th><th>"Status"</th><th>"Registered"</th><th>"Checked in"</th></tr></thead>
                <tbody>
                    <For each=move || registrations.with(|s| s.items.clone()) key=|r| (r.id, r.status.as_str().to_string()) let:reg>
                        <tr>
                            <td>{reg.event_name().to_string()}</td>
                            <td><StatusBadge status=reg.status.clone() /></td>
                            <td>{local_datetime(reg.created_at.as_ref())}</td>
                            <td>{local_datetime(reg.checked_in_at.as_ref())}</td>
                        </tr>
                    </For>
                </tbody>
            </table>
        </div>
    }
}
